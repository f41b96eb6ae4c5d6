//! Budget Engine - branch income statement budgeting
//!
//! This library provides:
//! - A table-driven line-item catalog and single-branch calculation engine
//! - Monthly or daily period projections with fiscal, quarter and range totals
//! - Branch-subset aggregation
//! - Daily distribution of quarterly/monthly budgets with exact reconciliation

pub mod aggregate;
pub mod assumptions;
pub mod catalog;
pub mod config;
pub mod distribution;
pub mod error;
pub mod projection;
pub mod revenue;
pub mod scenario;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use aggregate::{AggregatedBudget, Aggregator, BranchSelection};
pub use assumptions::{AllocationSet, AssumptionSet};
pub use catalog::{LineCode, RevenueTypeCode};
pub use config::{DistributionConfig, RunConfig};
pub use error::{BudgetError, Result};
pub use projection::{compute, BranchProjection, BudgetEngine, LineItemValues, PeriodTotals};
pub use revenue::{CareType, PeriodRevenue, RevenueSeries};
pub use scenario::{BudgetRun, BudgetRunner};
pub use source::{BranchInputs, BudgetSource, CsvSource, InMemorySource};
pub use types::{BranchId, Horizon, Period, Scenario};
