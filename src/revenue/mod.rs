//! Raw revenue figures by branch, period and care type

mod data;
pub mod loader;

pub use data::{CareType, PeriodRevenue, RevenueFigure, RevenueSeries};
pub use loader::{load_revenue, load_revenue_from_reader};
