//! Planning assumptions: per-line-item percentages and revenue-type allocations

mod allocation;
pub mod loader;
pub mod percent;

pub use allocation::{AllocationSet, RevenueTypeAllocation};
pub use loader::{load_allocations, load_allocations_from_reader, load_assumptions, load_assumptions_from_reader};

use crate::catalog::{self, LineCode, LineKind};
use crate::error::{BudgetError, Result};
use crate::types::{BranchId, Scenario};
use percent::{to_fraction, to_percent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stored assumption as delivered by the assumption store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub branch_id: BranchId,
    pub scenario: Scenario,
    pub year: i32,
    pub line_item_code: LineCode,
    /// Percent units (5 means 5%)
    pub percent: f64,
}

/// Assumption fractions of one branch/scenario/year, keyed by line item.
///
/// Only line items driven by an assumption may carry a value; absent items read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumptionSet {
    fractions: BTreeMap<LineCode, f64>,
}

impl AssumptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from percent-unit values
    pub fn from_percentages(percentages: impl IntoIterator<Item = (LineCode, f64)>) -> Result<Self> {
        let mut set = Self::new();
        for (code, percent) in percentages {
            set.set_percent(code, percent)?;
        }
        Ok(set)
    }

    pub fn set_percent(&mut self, code: LineCode, percent: f64) -> Result<()> {
        self.set_fraction(code, to_fraction(percent))
    }

    pub fn set_fraction(&mut self, code: LineCode, fraction: f64) -> Result<()> {
        if catalog::definition(code).kind != LineKind::DirectInputPercent {
            return Err(BudgetError::NotAnAssumption(code));
        }
        self.fractions.insert(code, fraction);
        Ok(())
    }

    pub fn fraction(&self, code: LineCode) -> f64 {
        self.fractions.get(&code).copied().unwrap_or(0.0)
    }

    pub fn percent(&self, code: LineCode) -> f64 {
        to_percent(self.fraction(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineCode, f64)> + '_ {
        self.fractions.iter().map(|(code, fraction)| (*code, *fraction))
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_absent_assumption_is_zero() {
        let set = AssumptionSet::new();
        assert_eq!(set.fraction(LineCode::Zakat), 0.0);
    }

    #[test]
    fn test_percent_stored_as_fraction() {
        let set = AssumptionSet::from_percentages([(LineCode::DisVolume, 1.0), (LineCode::Zakat, 2.5)]).unwrap();
        assert_relative_eq!(set.fraction(LineCode::DisVolume), 0.01);
        assert_relative_eq!(set.percent(LineCode::Zakat), 2.5);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_computed_item_rejected() {
        let mut set = AssumptionSet::new();
        assert!(matches!(
            set.set_percent(LineCode::Ebitda, 10.0),
            Err(BudgetError::NotAnAssumption(LineCode::Ebitda))
        ));
        assert!(set.set_percent(LineCode::RevTypeMoh, 40.0).is_err());
        assert!(set.is_empty());
    }
}
