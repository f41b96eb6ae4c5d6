//! Revenue-type allocations (payer mix) used by the rejection cross term

use super::percent::{to_fraction, to_percent};
use crate::catalog::RevenueTypeCode;
use crate::types::{BranchId, Scenario};
use serde::{Deserialize, Serialize};

/// One stored allocation as delivered by the assumption store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueTypeAllocation {
    pub branch_id: BranchId,
    pub scenario: Scenario,
    pub year: i32,
    pub revenue_type_code: RevenueTypeCode,
    /// Percent units (0-100)
    pub percent: f64,
}

/// Allocation fractions of one branch/scenario/year.
///
/// The four codes are not required to sum to 1; absent codes read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationSet {
    fractions: [f64; 4],
}

impl AllocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_percentages(percentages: impl IntoIterator<Item = (RevenueTypeCode, f64)>) -> Self {
        let mut set = Self::new();
        for (code, percent) in percentages {
            set.set_percent(code, percent);
        }
        set
    }

    pub fn set_percent(&mut self, code: RevenueTypeCode, percent: f64) {
        self.fractions[code.index()] = to_fraction(percent);
    }

    pub fn set_fraction(&mut self, code: RevenueTypeCode, fraction: f64) {
        self.fractions[code.index()] = fraction;
    }

    pub fn fraction(&self, code: RevenueTypeCode) -> f64 {
        self.fractions[code.index()]
    }

    pub fn percent(&self, code: RevenueTypeCode) -> f64 {
        to_percent(self.fraction(code))
    }

    /// Sum of the four fractions (not enforced to be 1)
    pub fn total_fraction(&self) -> f64 {
        self.fractions.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RevenueTypeCode, f64)> + '_ {
        RevenueTypeCode::ALL.into_iter().map(move |code| (code, self.fraction(code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_absent_codes_are_zero() {
        let set = AllocationSet::from_percentages([(RevenueTypeCode::Moh, 40.0)]);
        assert_relative_eq!(set.fraction(RevenueTypeCode::Moh), 0.4);
        assert_eq!(set.fraction(RevenueTypeCode::Cash), 0.0);
        assert_relative_eq!(set.percent(RevenueTypeCode::Moh), 40.0);
    }

    #[test]
    fn test_total_not_forced_to_one() {
        let set = AllocationSet::from_percentages([
            (RevenueTypeCode::Insurance, 70.0),
            (RevenueTypeCode::Moh, 50.0),
        ]);
        assert_relative_eq!(set.total_fraction(), 1.2);
    }
}
