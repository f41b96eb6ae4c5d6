//! Daily budget distribution
//!
//! Quarterly or monthly budget rows are spread over calendar days using
//! historical day-position weights and calendar factors. Amounts are exact
//! decimals so each span's days add back to the row total.

mod allocate;
pub mod calendar;
mod distribute;
pub mod loader;
mod records;
mod series;
mod summary;
mod weights;

pub use allocate::{allocate_exact, round_total};
pub use calendar::{CalendarFactors, DateRange, DayCalendar, DayType, HolidayCalendar};
pub use distribute::{roll_up, DailyDistribution, DistributionTotals, Distributor};
pub use loader::{load_actuals, load_actuals_from_reader, load_budget_rows, load_budget_rows_from_reader};
pub use records::{ActualRow, BudgetRow, DailyRecord, StayType};
pub use series::daily_revenue_series;
pub use summary::{summarize, PeriodGrain, ReconciliationRule, SummaryRow};
pub use weights::{SlotWeight, WeightEntry, WeightTable};
