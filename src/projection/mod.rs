//! Calculation engine and period iterator for single-branch income statements

mod engine;
mod period;
mod values;

pub use engine::{compute, BudgetEngine};
pub use period::{BranchProjection, DisplayStatement, PeriodTotals};
pub use values::{round_to, LineItemValue, LineItemValues};
