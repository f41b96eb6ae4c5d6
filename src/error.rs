//! Error type for the data boundary (loading and parsing external inputs)
//!
//! The computation itself never fails: absent inputs are zero. Only text coming
//! from outside the crate can be rejected.

use crate::catalog::LineCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("unknown line item code: {0}")]
    UnknownLineItem(String),

    #[error("line item {0} is not driven by an assumption percentage")]
    NotAnAssumption(LineCode),

    #[error("unknown care type: {0}")]
    UnknownCareType(String),

    #[error("unknown revenue type code: {0}")]
    UnknownRevenueType(String),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("unknown stay type: {0}")]
    UnknownStayType(String),

    #[error("invalid branch selection: {0}")]
    InvalidSelection(String),

    #[error("unknown period grain: {0}")]
    UnknownGrain(String),

    #[error("non-numeric value {value:?} for {field}")]
    NonNumeric { field: String, value: String },

    #[error("negative revenue {amount} for branch {branch_id} period {period}")]
    NegativeRevenue { branch_id: u8, period: u16, amount: f64 },

    #[error("period {period} is outside a horizon of {horizon} periods")]
    PeriodOutOfRange { period: u16, horizon: u16 },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BudgetError>;
