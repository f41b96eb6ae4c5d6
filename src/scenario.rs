//! Budget runner: fetch branch inputs, project in parallel, roll up
//!
//! Both presentations go through here. The assumption editor looks at one branch
//! (`branch_statement`); the budget view looks at a branch subset (`run`). Each
//! uses the same `compute`, so the same inputs give the same numbers.

use crate::aggregate::{average_allocations, AggregatedBudget, Aggregator, BranchSelection};
use crate::assumptions::AllocationSet;
use crate::config::RunConfig;
use crate::distribution::{daily_revenue_series, DayCalendar};
use crate::projection::{BranchProjection, BudgetEngine};
use crate::source::{BranchInputs, BudgetSource};
use crate::types::{BranchId, Horizon};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

/// Branch projections and their roll-up for one run
#[derive(Debug, Clone, Serialize)]
pub struct BudgetRun {
    pub selection: String,
    pub projections: Vec<BranchProjection>,
    pub aggregate: AggregatedBudget,
    /// Revenue-type mix averaged over the selected branches
    pub allocations: AllocationSet,
}

/// Runs one scenario/year over any branch subset
///
/// # Example
/// ```ignore
/// let runner = BudgetRunner::new(RunConfig::default());
/// let source = CsvSource::from_dir("data");
/// let run = runner.run(&source, &"all".parse()?);
/// let q1 = run.aggregate.quarter_total(1);
/// ```
#[derive(Debug, Clone)]
pub struct BudgetRunner {
    config: RunConfig,
    calendar: DayCalendar,
}

impl BudgetRunner {
    pub fn new(config: RunConfig) -> Self {
        let calendar = config.distribution.day_calendar();
        Self { config, calendar }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn horizon(&self) -> Horizon {
        self.config.horizon()
    }

    /// Fetch one branch's inputs.
    ///
    /// A failed fetch is logged and that input defaults to empty; it never affects
    /// other inputs or other branches.
    pub fn fetch_inputs<S: BudgetSource + ?Sized>(&self, source: &S, branch_id: BranchId) -> BranchInputs {
        let (year, scenario) = (self.config.year, self.config.scenario);

        let revenue = source.revenue(branch_id, year).unwrap_or_else(|e| {
            warn!("Branch {}: revenue unavailable ({}); using zero revenue", branch_id, e);
            Default::default()
        });
        let assumptions = source.assumptions(branch_id, scenario, year).unwrap_or_else(|e| {
            warn!("Branch {}: assumptions unavailable ({}); using zero assumptions", branch_id, e);
            Default::default()
        });
        let allocations = source.allocations(branch_id, scenario, year).unwrap_or_else(|e| {
            warn!("Branch {}: allocations unavailable ({}); using zero allocations", branch_id, e);
            Default::default()
        });

        BranchInputs {
            revenue,
            assumptions,
            allocations,
        }
    }

    /// Project already-fetched inputs over the run's horizon
    pub fn project(&self, branch_id: BranchId, inputs: &BranchInputs) -> BranchProjection {
        let horizon = self.horizon();
        let engine = BudgetEngine::new(inputs.assumptions.clone(), inputs.allocations, horizon);
        match horizon {
            Horizon::Monthly => engine.project_branch(branch_id, &inputs.revenue),
            Horizon::Daily { year } => {
                let daily = daily_revenue_series(
                    &inputs.revenue,
                    year,
                    &self.calendar,
                    self.config.distribution.decimals,
                );
                engine.project_branch(branch_id, &daily)
            }
        }
    }

    /// Single-branch statement, as shown while editing that branch's assumptions
    pub fn branch_statement<S: BudgetSource + ?Sized>(&self, source: &S, branch_id: BranchId) -> BranchProjection {
        let inputs = self.fetch_inputs(source, branch_id);
        self.project(branch_id, &inputs)
    }

    /// Multi-branch budget view.
    ///
    /// Branches are fetched and projected in parallel; results are in branch order.
    pub fn run<S: BudgetSource + ?Sized>(&self, source: &S, selection: &BranchSelection) -> BudgetRun {
        let branches = selection.resolve(&self.config.branch_ids());
        info!(
            "Running {} {} for branches {} ({} branches)",
            self.config.scenario,
            self.config.year,
            selection,
            branches.len()
        );

        let results: Vec<(BranchId, BranchInputs, BranchProjection)> = branches
            .par_iter()
            .map(|&branch_id| {
                let inputs = self.fetch_inputs(source, branch_id);
                let projection = self.project(branch_id, &inputs);
                (branch_id, inputs, projection)
            })
            .collect();

        let allocations = average_allocations(
            selection,
            results.iter().map(|(branch_id, inputs, _)| (*branch_id, &inputs.allocations)),
        );
        let projections: Vec<BranchProjection> = results.into_iter().map(|(_, _, p)| p).collect();
        let aggregate = Aggregator::new(self.horizon()).aggregate(selection, &projections);

        BudgetRun {
            selection: selection.to_string(),
            projections,
            aggregate,
            allocations,
        }
    }
}

impl Default for BudgetRunner {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::AssumptionSet;
    use crate::catalog::{LineCode, RevenueTypeCode};
    use crate::config::HorizonKind;
    use crate::error::{BudgetError, Result};
    use crate::projection::PeriodTotals;
    use crate::revenue::{PeriodRevenue, RevenueSeries};
    use crate::source::InMemorySource;
    use crate::types::{Period, Scenario};
    use approx::assert_relative_eq;

    fn inputs(scale: f64) -> BranchInputs {
        let mut revenue = RevenueSeries::new();
        for month in 1..=12u16 {
            revenue.set_period(
                Period(month),
                PeriodRevenue::new(100_000.0 * scale, 50_000.0 * scale, 10_000.0 * scale),
            );
        }
        BranchInputs {
            revenue,
            assumptions: AssumptionSet::from_percentages([
                (LineCode::DisRejectionMoh, 2.0),
                (LineCode::DisRejectionIns, 3.0),
                (LineCode::DisVolume, 1.0),
                (LineCode::DisEarlyPay, 0.5),
                (LineCode::DcPharmaceuticals, 10.0),
            ])
            .unwrap(),
            allocations: AllocationSet::from_percentages([
                (RevenueTypeCode::Moh, 40.0),
                (RevenueTypeCode::Insurance, 50.0),
            ]),
        }
    }

    fn source() -> InMemorySource {
        InMemorySource::new(Scenario::MostLikely, 2025)
            .with_branch(1, inputs(1.0))
            .with_branch(2, inputs(0.5))
            .with_branch(3, inputs(2.0))
    }

    /// Delegates to an in-memory source but fails every fetch for one branch
    struct FlakySource {
        inner: InMemorySource,
        broken: BranchId,
    }

    impl FlakySource {
        fn check(&self, branch_id: BranchId) -> Result<()> {
            if branch_id == self.broken {
                Err(BudgetError::Io(std::io::Error::other("connection reset")))
            } else {
                Ok(())
            }
        }
    }

    impl BudgetSource for FlakySource {
        fn revenue(&self, branch_id: BranchId, year: i32) -> Result<RevenueSeries> {
            self.check(branch_id)?;
            self.inner.revenue(branch_id, year)
        }

        fn assumptions(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AssumptionSet> {
            self.check(branch_id)?;
            self.inner.assumptions(branch_id, scenario, year)
        }

        fn allocations(&self, branch_id: BranchId, scenario: Scenario, year: i32) -> Result<AllocationSet> {
            self.check(branch_id)?;
            self.inner.allocations(branch_id, scenario, year)
        }
    }

    #[test]
    fn test_editor_and_budget_views_agree() {
        let runner = BudgetRunner::default();
        let source = source();

        let editor = runner.branch_statement(&source, 1);
        let budget = runner.run(&source, &BranchSelection::Single(1));

        assert_eq!(editor.period_values(), budget.aggregate.period_values());
        assert_eq!(editor, budget.projections[0]);
        assert_relative_eq!(editor.period(Period(1))[LineCode::RevNet], 153_920.0, max_relative = 1e-12);
    }

    #[test]
    fn test_run_all_branches() {
        let runner = BudgetRunner::default();
        let run = runner.run(&source(), &BranchSelection::All);

        // Default config names six branches; 4-6 have no data and contribute zero
        assert_eq!(run.projections.len(), 6);
        assert!(run.projections[5].fiscal_total().is_zero());
        assert_eq!(run.aggregate.branches, vec![1, 2, 3, 4, 5, 6]);

        // 1.0 + 0.5 + 2.0 times the single-branch figure
        assert_relative_eq!(
            run.aggregate.fiscal_total()[LineCode::GrossProfit],
            138_528.0 * 12.0 * 3.5,
            max_relative = 1e-12
        );
        assert_relative_eq!(run.allocations.percent(RevenueTypeCode::Moh), 40.0, max_relative = 1e-12);
    }

    #[test]
    fn test_failing_branch_does_not_corrupt_others() {
        let runner = BudgetRunner::default();
        let healthy = runner.run(&source(), &BranchSelection::All);
        let flaky = FlakySource {
            inner: source(),
            broken: 2,
        };
        let degraded = runner.run(&flaky, &BranchSelection::All);

        assert!(degraded.projections[1].fiscal_total().is_zero());
        assert_eq!(degraded.projections[0], healthy.projections[0]);
        assert_eq!(degraded.projections[2], healthy.projections[2]);
    }

    #[test]
    fn test_daily_horizon_matches_monthly_totals() {
        let config = RunConfig {
            horizon: HorizonKind::Daily,
            ..RunConfig::default()
        };
        let daily_runner = BudgetRunner::new(config);
        let monthly_runner = BudgetRunner::default();
        let source = source();

        let daily = daily_runner.branch_statement(&source, 1);
        let monthly = monthly_runner.branch_statement(&source, 1);
        assert_eq!(daily.period_values().len(), 365);

        // The cascade is linear, so spreading revenue first changes nothing in total
        for code in [LineCode::RevSub, LineCode::RevNet, LineCode::TotalDc, LineCode::TotalCompIncome] {
            assert_relative_eq!(daily.fiscal_total()[code], monthly.fiscal_total()[code], max_relative = 1e-9);
            assert_relative_eq!(daily.quarter_total(2)[code], monthly.quarter_total(2)[code], max_relative = 1e-9);
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let runner = BudgetRunner::default();
        let source = source();
        let first = runner.run(&source, &BranchSelection::All);
        let second = runner.run(&source, &BranchSelection::All);
        assert_eq!(first.aggregate, second.aggregate);
    }
}
