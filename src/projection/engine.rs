//! Core calculation engine: one branch, one period, every line item

use super::period::BranchProjection;
use super::values::LineItemValues;
use crate::assumptions::{AllocationSet, AssumptionSet};
use crate::catalog::{self, Formula, LineItemDefinition};
use crate::revenue::{PeriodRevenue, RevenueSeries};
use crate::types::{BranchId, Horizon, Period};
use log::debug;
use rayon::prelude::*;

/// Compute every line item for one branch and period.
///
/// Walks the catalog in evaluation order, so each formula only reads values
/// already written. Absent inputs are zero; this never fails.
pub fn compute(
    revenue: &PeriodRevenue,
    assumptions: &AssumptionSet,
    allocations: &AllocationSet,
) -> LineItemValues {
    let mut values = LineItemValues::zero();
    for definition in catalog::definitions() {
        let amount = evaluate(definition, &values, revenue, assumptions, allocations);
        values.set(definition.code, amount);
    }
    values
}

fn evaluate(
    definition: &LineItemDefinition,
    values: &LineItemValues,
    revenue: &PeriodRevenue,
    assumptions: &AssumptionSet,
    allocations: &AllocationSet,
) -> f64 {
    match definition.formula {
        Formula::Raw(care_type) => revenue.amount(care_type),
        Formula::PercentOf(base) => values[base] * assumptions.fraction(definition.code),
        Formula::ShareOf { base, allocation } => values[base] * allocations.fraction(allocation),
        Formula::RejectionSplit { base, allocation } => {
            values[base] * assumptions.fraction(definition.code) * allocations.fraction(allocation)
        }
        Formula::Sum(items) => items.iter().fold(0.0, |acc, code| acc + values[*code]),
        Formula::Net { from, less, plus } => {
            let mut amount = values[from];
            for code in less {
                amount -= values[*code];
            }
            for code in plus {
                amount += values[*code];
            }
            amount
        }
    }
}

/// Engine bound to one branch/scenario/year's assumptions
#[derive(Debug, Clone)]
pub struct BudgetEngine {
    assumptions: AssumptionSet,
    allocations: AllocationSet,
    horizon: Horizon,
}

impl BudgetEngine {
    pub fn new(assumptions: AssumptionSet, allocations: AllocationSet, horizon: Horizon) -> Self {
        Self {
            assumptions,
            allocations,
            horizon,
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.assumptions
    }

    pub fn allocations(&self) -> &AllocationSet {
        &self.allocations
    }

    /// Compute a single period
    pub fn compute_period(&self, revenue: &PeriodRevenue) -> LineItemValues {
        compute(revenue, &self.assumptions, &self.allocations)
    }

    /// Run every period of the horizon for one branch.
    ///
    /// Periods are independent and evaluated in parallel; output is in period order.
    pub fn project_branch(&self, branch_id: BranchId, revenue: &RevenueSeries) -> BranchProjection {
        let len = usize::from(self.horizon.len());
        let periods: Vec<LineItemValues> = (0..len)
            .into_par_iter()
            .map(|i| self.compute_period(&revenue.period(Period(i as u16 + 1))))
            .collect();

        let ignored = revenue.iter().filter(|(p, _)| !self.horizon.contains(*p)).count();
        if ignored > 0 {
            debug!("Branch {}: {} revenue periods fall outside the horizon", branch_id, ignored);
        }

        BranchProjection::new(branch_id, self.horizon, periods)
    }
}
