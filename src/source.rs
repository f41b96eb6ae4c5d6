//! Where branch inputs come from
//!
//! The engine takes its inputs as plain values; a `BudgetSource` is the seam to
//! whatever store holds them. Fetching is fallible, computing is not.

use crate::assumptions::{load_allocations, load_assumptions, AllocationSet, AssumptionSet};
use crate::error::Result;
use crate::revenue::{load_revenue, RevenueSeries};
use crate::types::{BranchId, Horizon, Scenario};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const REVENUE_FILE: &str = "revenue.csv";
pub const ASSUMPTIONS_FILE: &str = "assumptions.csv";
pub const ALLOCATIONS_FILE: &str = "allocations.csv";

/// Per-branch data provider. Monthly revenue; assumptions and allocations in
/// fractions. Absent data is an empty value, not an error.
pub trait BudgetSource: Sync {
    fn revenue(&self, branch_id: BranchId, year: i32) -> Result<RevenueSeries>;

    fn assumptions(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AssumptionSet>;

    fn allocations(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AllocationSet>;
}

/// Everything the engine needs for one branch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchInputs {
    pub revenue: RevenueSeries,
    pub assumptions: AssumptionSet,
    pub allocations: AllocationSet,
}

/// Source held in memory, keyed by branch
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    scenario: Scenario,
    year: i32,
    branches: HashMap<BranchId, BranchInputs>,
}

impl InMemorySource {
    pub fn new(scenario: Scenario, year: i32) -> Self {
        Self {
            scenario,
            year,
            branches: HashMap::new(),
        }
    }

    pub fn insert(&mut self, branch_id: BranchId, inputs: BranchInputs) {
        self.branches.insert(branch_id, inputs);
    }

    pub fn with_branch(mut self, branch_id: BranchId, inputs: BranchInputs) -> Self {
        self.insert(branch_id, inputs);
        self
    }

    fn branch(&self, branch_id: BranchId, scenario: Option<Scenario>, year: i32) -> Option<&BranchInputs> {
        if year != self.year || scenario.is_some_and(|s| s != self.scenario) {
            return None;
        }
        self.branches.get(&branch_id)
    }
}

impl BudgetSource for InMemorySource {
    fn revenue(&self, branch_id: BranchId, year: i32) -> Result<RevenueSeries> {
        Ok(self.branch(branch_id, None, year).map(|b| b.revenue.clone()).unwrap_or_default())
    }

    fn assumptions(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AssumptionSet> {
        Ok(self
            .branch(branch_id, Some(scenario), year)
            .map(|b| b.assumptions.clone())
            .unwrap_or_default())
    }

    fn allocations(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AllocationSet> {
        Ok(self
            .branch(branch_id, Some(scenario), year)
            .map(|b| b.allocations)
            .unwrap_or_default())
    }
}

/// Source reading revenue.csv, assumptions.csv and allocations.csv from a directory.
///
/// Files are read on each call, so edits are picked up between runs. A missing
/// file means no data.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn file(&self, name: &str) -> Option<PathBuf> {
        let path = self.dir.join(name);
        if path.exists() {
            Some(path)
        } else {
            debug!("{} not found; treating as no data", path.display());
            None
        }
    }
}

impl BudgetSource for CsvSource {
    fn revenue(&self, branch_id: BranchId, year: i32) -> Result<RevenueSeries> {
        let Some(path) = self.file(REVENUE_FILE) else {
            return Ok(RevenueSeries::default());
        };
        let mut by_branch = load_revenue(path, year, &Horizon::Monthly)?;
        Ok(by_branch.remove(&branch_id).unwrap_or_default())
    }

    fn assumptions(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AssumptionSet> {
        let Some(path) = self.file(ASSUMPTIONS_FILE) else {
            return Ok(AssumptionSet::default());
        };
        let mut by_branch = load_assumptions(path, scenario, year)?;
        Ok(by_branch.remove(&branch_id).unwrap_or_default())
    }

    fn allocations(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AllocationSet> {
        let Some(path) = self.file(ALLOCATIONS_FILE) else {
            return Ok(AllocationSet::default());
        };
        let mut by_branch = load_allocations(path, scenario, year)?;
        Ok(by_branch.remove(&branch_id).unwrap_or_default())
    }
}
