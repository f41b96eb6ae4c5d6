//! Period iterator output: per-period values with fiscal and range totals

use super::values::{LineItemValue, LineItemValues};
use crate::types::{BranchId, Horizon, Period};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Totals over a period-indexed table of line item values.
///
/// Totals are always summed from full-precision period values.
pub trait PeriodTotals {
    fn horizon(&self) -> Horizon;

    /// Values in period order (index 0 = period 1)
    fn period_values(&self) -> &[LineItemValues];

    fn period(&self, period: Period) -> LineItemValues {
        if !self.horizon().contains(period) {
            return LineItemValues::zero();
        }
        self.period_values()
            .get(period.index())
            .copied()
            .unwrap_or_default()
    }

    /// Sum of every period
    fn fiscal_total(&self) -> LineItemValues {
        self.period_values().iter().sum()
    }

    /// Sum of an inclusive period range; periods outside the horizon contribute nothing
    fn range_total(&self, range: RangeInclusive<Period>) -> LineItemValues {
        let values = self.period_values();
        let start = range.start().index();
        let end = (range.end().0 as usize).min(values.len());
        if start >= end {
            return LineItemValues::zero();
        }
        values[start..end].iter().sum()
    }

    fn quarter_total(&self, quarter: u8) -> LineItemValues {
        self.range_total(self.horizon().quarter(quarter))
    }

    /// Rounded view for presentation.
    ///
    /// Period values are rounded first and the displayed total is the sum of those
    /// rounded values, so displayed columns foot. Internal totals are unaffected.
    fn display(&self, decimals: u32) -> DisplayStatement {
        let periods: Vec<LineItemValues> = self
            .period_values()
            .iter()
            .map(|values| values.rounded(decimals))
            .collect();
        let total = periods.iter().sum::<LineItemValues>().rounded(decimals);
        DisplayStatement { periods, total }
    }
}

/// Rounded statement ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayStatement {
    pub periods: Vec<LineItemValues>,
    pub total: LineItemValues,
}

/// All periods of one branch's horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchProjection {
    pub branch_id: BranchId,
    pub horizon: Horizon,
    periods: Vec<LineItemValues>,
}

impl BranchProjection {
    pub fn new(branch_id: BranchId, horizon: Horizon, periods: Vec<LineItemValues>) -> Self {
        debug_assert_eq!(periods.len(), usize::from(horizon.len()));
        Self {
            branch_id,
            horizon,
            periods,
        }
    }

    /// A branch with no data: every period is zero
    pub fn empty(branch_id: BranchId, horizon: Horizon) -> Self {
        Self::new(branch_id, horizon, vec![LineItemValues::zero(); usize::from(horizon.len())])
    }

    /// Flatten into individual values for export
    pub fn line_item_values(&self) -> Vec<LineItemValue> {
        self.horizon
            .periods()
            .zip(&self.periods)
            .flat_map(|(period, values)| values.to_values(self.branch_id, period))
            .collect()
    }
}

impl PeriodTotals for BranchProjection {
    fn horizon(&self) -> Horizon {
        self.horizon
    }

    fn period_values(&self) -> &[LineItemValues] {
        &self.periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LineCode;

    fn projection_with_revenue(amounts: &[f64]) -> BranchProjection {
        let periods = amounts
            .iter()
            .map(|amount| {
                let mut values = LineItemValues::zero();
                values.set(LineCode::RevIp, *amount);
                values
            })
            .collect();
        BranchProjection::new(1, Horizon::Monthly, periods)
    }

    #[test]
    fn test_fiscal_total_full_precision() {
        let projection = projection_with_revenue(&[0.125; 12]);
        // Summing display-rounded values would give 0.13 * 12
        assert_eq!(projection.fiscal_total()[LineCode::RevIp], 1.5);
    }

    #[test]
    fn test_quarter_and_range_totals() {
        let amounts: Vec<f64> = (1..=12).map(f64::from).collect();
        let projection = projection_with_revenue(&amounts);
        assert_eq!(projection.quarter_total(1)[LineCode::RevIp], 6.0);
        assert_eq!(projection.quarter_total(4)[LineCode::RevIp], 33.0);
        assert_eq!(projection.range_total(Period(2)..=Period(4))[LineCode::RevIp], 9.0);
        assert_eq!(projection.range_total(Period(11)..=Period(20))[LineCode::RevIp], 23.0);
        assert!(projection.range_total(Period(5)..=Period(4)).is_zero());
    }

    #[test]
    fn test_display_columns_foot() {
        let projection = projection_with_revenue(&[0.125; 12]);
        let display = projection.display(2);
        assert_eq!(display.periods[0][LineCode::RevIp], 0.13);
        assert_eq!(display.total[LineCode::RevIp], 1.56);
        // Internal total is still computed from unrounded values
        assert_eq!(projection.fiscal_total()[LineCode::RevIp], 1.5);
    }

    #[test]
    fn test_out_of_horizon_period_is_zero() {
        let projection = projection_with_revenue(&[1.0; 12]);
        assert!(projection.period(Period(13)).is_zero());
        assert!(BranchProjection::empty(2, Horizon::Monthly).fiscal_total().is_zero());
    }

    #[test]
    fn test_line_item_values_flatten() {
        let projection = projection_with_revenue(&[1.0; 12]);
        let flat = projection.line_item_values();
        assert_eq!(flat.len(), 12 * LineCode::COUNT);
        assert_eq!(flat[LineCode::COUNT].period, Period(2));
    }
}
