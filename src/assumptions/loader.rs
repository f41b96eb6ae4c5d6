//! CSV-based assumption loader
//!
//! Reads `assumptions.csv` and `allocations.csv` exported from the assumption
//! store and keeps the rows for one scenario and year, grouped by branch.

use super::percent::parse_percent;
use super::{AllocationSet, Assumption, AssumptionSet, RevenueTypeAllocation};
use crate::catalog::{LineCode, RevenueTypeCode};
use crate::error::Result;
use crate::types::{BranchId, Scenario};
use csv::Reader;
use log::debug;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Raw CSV row matching assumptions.csv columns
#[derive(Debug, serde::Deserialize)]
struct AssumptionRow {
    #[serde(rename = "BranchId")]
    branch_id: BranchId,
    #[serde(rename = "Scenario")]
    scenario: String,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "LineItemCode")]
    line_item_code: String,
    #[serde(rename = "Percent")]
    percent: String,
}

impl AssumptionRow {
    fn to_assumption(&self) -> Result<Assumption> {
        Ok(Assumption {
            branch_id: self.branch_id,
            scenario: self.scenario.parse()?,
            year: self.year,
            line_item_code: self.line_item_code.parse::<LineCode>()?,
            percent: parse_percent(&self.line_item_code, &self.percent)?,
        })
    }
}

/// Raw CSV row matching allocations.csv columns
#[derive(Debug, serde::Deserialize)]
struct AllocationRow {
    #[serde(rename = "BranchId")]
    branch_id: BranchId,
    #[serde(rename = "Scenario")]
    scenario: String,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "RevenueTypeCode")]
    revenue_type_code: String,
    #[serde(rename = "Percent")]
    percent: String,
}

impl AllocationRow {
    fn to_allocation(&self) -> Result<RevenueTypeAllocation> {
        Ok(RevenueTypeAllocation {
            branch_id: self.branch_id,
            scenario: self.scenario.parse()?,
            year: self.year,
            revenue_type_code: self.revenue_type_code.parse::<RevenueTypeCode>()?,
            percent: parse_percent(&self.revenue_type_code, &self.percent)?,
        })
    }
}

/// Load assumption sets for one scenario/year from any reader
///
/// Every row is validated, including rows for other scenarios or years, so a bad
/// export fails as a whole rather than silently dropping lines. A later row for the
/// same branch and code replaces an earlier one.
pub fn load_assumptions_from_reader<R: Read>(
    reader: R,
    scenario: Scenario,
    year: i32,
) -> Result<HashMap<BranchId, AssumptionSet>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut sets: HashMap<BranchId, AssumptionSet> = HashMap::new();
    let mut kept = 0usize;

    for result in csv_reader.deserialize() {
        let row: AssumptionRow = result?;
        let assumption = row.to_assumption()?;
        if assumption.scenario != scenario || assumption.year != year {
            continue;
        }
        sets.entry(assumption.branch_id)
            .or_default()
            .set_percent(assumption.line_item_code, assumption.percent)?;
        kept += 1;
    }

    debug!("Loaded {} assumptions for {} branches ({} {})", kept, sets.len(), scenario, year);
    Ok(sets)
}

/// Load assumption sets from a CSV file
pub fn load_assumptions<P: AsRef<Path>>(
    path: P,
    scenario: Scenario,
    year: i32,
) -> Result<HashMap<BranchId, AssumptionSet>> {
    let file = std::fs::File::open(path)?;
    load_assumptions_from_reader(file, scenario, year)
}

/// Load revenue-type allocations for one scenario/year from any reader
pub fn load_allocations_from_reader<R: Read>(
    reader: R,
    scenario: Scenario,
    year: i32,
) -> Result<HashMap<BranchId, AllocationSet>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut sets: HashMap<BranchId, AllocationSet> = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: AllocationRow = result?;
        let allocation = row.to_allocation()?;
        if allocation.scenario != scenario || allocation.year != year {
            continue;
        }
        sets.entry(allocation.branch_id)
            .or_default()
            .set_percent(allocation.revenue_type_code, allocation.percent);
    }

    debug!("Loaded allocations for {} branches ({} {})", sets.len(), scenario, year);
    Ok(sets)
}

/// Load revenue-type allocations from a CSV file
pub fn load_allocations<P: AsRef<Path>>(
    path: P,
    scenario: Scenario,
    year: i32,
) -> Result<HashMap<BranchId, AllocationSet>> {
    let file = std::fs::File::open(path)?;
    load_allocations_from_reader(file, scenario, year)
}
