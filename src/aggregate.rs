//! Branch-subset aggregation of per-branch period values
//!
//! The calculation engine is always single-branch; every multi-branch figure is
//! produced here by summing branch projections period by period.

use crate::assumptions::AllocationSet;
use crate::catalog::RevenueTypeCode;
use crate::error::{BudgetError, Result};
use crate::projection::{BranchProjection, LineItemValues, PeriodTotals};
use crate::types::{BranchId, Horizon};
use log::warn;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Which branches a view covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BranchSelection {
    #[default]
    All,
    Single(BranchId),
    Subset(BTreeSet<BranchId>),
}

impl BranchSelection {
    pub fn includes(&self, branch_id: BranchId) -> bool {
        match self {
            BranchSelection::All => true,
            BranchSelection::Single(id) => *id == branch_id,
            BranchSelection::Subset(ids) => ids.contains(&branch_id),
        }
    }

    /// Branch ids the selection names, given the branches known to the caller
    pub fn resolve(&self, available: &[BranchId]) -> Vec<BranchId> {
        match self {
            BranchSelection::All => {
                let ids: BTreeSet<BranchId> = available.iter().copied().collect();
                ids.into_iter().collect()
            }
            BranchSelection::Single(id) => vec![*id],
            BranchSelection::Subset(ids) => ids.iter().copied().collect(),
        }
    }
}

impl FromStr for BranchSelection {
    type Err = BudgetError;

    /// `all`, a single id (`3`) or a comma separated list (`1,2,5`)
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(BranchSelection::All);
        }

        let ids = trimmed
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<BranchId>()
                    .map_err(|_| BudgetError::InvalidSelection(s.to_string()))
            })
            .collect::<Result<BTreeSet<BranchId>>>()?;

        match ids.len() {
            0 => Err(BudgetError::InvalidSelection(s.to_string())),
            1 => Ok(BranchSelection::Single(*ids.iter().next().unwrap_or(&0))),
            _ => Ok(BranchSelection::Subset(ids)),
        }
    }
}

impl fmt::Display for BranchSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchSelection::All => f.write_str("all"),
            BranchSelection::Single(id) => write!(f, "{}", id),
            BranchSelection::Subset(ids) => {
                let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

/// Per-period sums over a branch subset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedBudget {
    pub branches: Vec<BranchId>,
    pub horizon: Horizon,
    periods: Vec<LineItemValues>,
}

impl PeriodTotals for AggregatedBudget {
    fn horizon(&self) -> Horizon {
        self.horizon
    }

    fn period_values(&self) -> &[LineItemValues] {
        &self.periods
    }
}

/// Rolls branch projections up into a selected subset
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    horizon: Horizon,
}

impl Aggregator {
    pub fn new(horizon: Horizon) -> Self {
        Self { horizon }
    }

    /// Sum the selected branches period by period.
    ///
    /// A selected branch without a projection contributes zero. Branches are summed
    /// in id order so the result does not depend on input order.
    pub fn aggregate(&self, selection: &BranchSelection, projections: &[BranchProjection]) -> AggregatedBudget {
        let len = usize::from(self.horizon.len());
        let mut periods = vec![LineItemValues::zero(); len];

        let mut selected: Vec<&BranchProjection> = projections
            .iter()
            .filter(|projection| selection.includes(projection.branch_id))
            .collect();
        selected.sort_by_key(|projection| projection.branch_id);

        for projection in &selected {
            if projection.horizon != self.horizon {
                warn!(
                    "Branch {} projected over {:?}, expected {:?}; skipped",
                    projection.branch_id, projection.horizon, self.horizon
                );
                continue;
            }
            for (total, values) in periods.iter_mut().zip(projection.period_values()) {
                *total += values;
            }
        }

        let available: Vec<BranchId> = selected.iter().map(|p| p.branch_id).collect();
        AggregatedBudget {
            branches: selection.resolve(&available),
            horizon: self.horizon,
            periods,
        }
    }
}

/// Average revenue-type allocation across the selected branches.
///
/// Each payer percent is a straight average over branches whose percent for that
/// payer is nonzero; it is not weighted by revenue.
pub fn average_allocations<'a>(
    selection: &BranchSelection,
    allocations: impl IntoIterator<Item = (BranchId, &'a AllocationSet)>,
) -> AllocationSet {
    let selected: Vec<&AllocationSet> = allocations
        .into_iter()
        .filter(|(branch_id, _)| selection.includes(*branch_id))
        .map(|(_, set)| set)
        .collect();

    let mut average = AllocationSet::new();
    for code in RevenueTypeCode::ALL {
        let nonzero: Vec<f64> = selected
            .iter()
            .map(|set| set.fraction(code))
            .filter(|fraction| *fraction != 0.0)
            .collect();
        if !nonzero.is_empty() {
            average.set_fraction(code, nonzero.iter().sum::<f64>() / nonzero.len() as f64);
        }
    }
    average
}
