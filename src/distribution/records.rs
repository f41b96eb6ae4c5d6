//! Budget rows, historical actuals and generated daily records

use super::calendar::month_days;
use crate::error::{BudgetError, Result};
use crate::types::{quarter_of_month, BranchId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stay-type category of a budget line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StayType {
    #[serde(rename = "OP")]
    Op,
    #[serde(rename = "ER")]
    Er,
    #[serde(rename = "Non-LTC")]
    NonLtc,
    #[serde(rename = "LTC")]
    Ltc,
}

impl StayType {
    pub const ALL: [StayType; 4] = [StayType::Op, StayType::Er, StayType::NonLtc, StayType::Ltc];

    pub fn as_str(&self) -> &'static str {
        match self {
            StayType::Op => "OP",
            StayType::Er => "ER",
            StayType::NonLtc => "Non-LTC",
            StayType::Ltc => "LTC",
        }
    }

    /// Long-stay rows are budgeted without a speciality
    pub fn is_long_stay(&self) -> bool {
        matches!(self, StayType::Ltc)
    }
}

impl FromStr for StayType {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "OP" => Ok(StayType::Op),
            "ER" => Ok(StayType::Er),
            "NONLTC" => Ok(StayType::NonLtc),
            "LTC" => Ok(StayType::Ltc),
            _ => Err(BudgetError::UnknownStayType(s.to_string())),
        }
    }
}

impl fmt::Display for StayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One quarterly or monthly budget line to spread over days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRow {
    pub branch_id: BranchId,
    pub year: i32,
    pub quarter: u8,
    /// `None` for a quarterly row
    pub month: Option<u32>,
    pub care_type: String,
    pub stay_type: StayType,
    pub speciality: Option<String>,
    pub census: Decimal,
    pub episodes: Decimal,
    pub cpe: Decimal,
    pub alos: Decimal,
    pub revenue: Decimal,
}

impl BudgetRow {
    /// Months the row spans
    pub fn months(&self) -> Vec<u32> {
        match self.month {
            Some(month) => vec![month],
            None => {
                let first = u32::from(self.quarter.clamp(1, 4)) * 3 - 2;
                (first..first + 3).collect()
            }
        }
    }

    /// Every calendar day of the row's span
    pub fn days(&self) -> Vec<NaiveDate> {
        self.months()
            .into_iter()
            .flat_map(|month| month_days(self.year, month))
            .collect()
    }

    /// Quarter implied by the row's month, or its stated quarter
    pub fn effective_quarter(&self) -> u8 {
        self.month.map(quarter_of_month).unwrap_or(self.quarter)
    }
}

/// Historical actuals for one weekday position of a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualRow {
    pub branch_id: BranchId,
    pub month: u32,
    /// 1 for the first occurrence of a weekday in the month, 2 for the second...
    pub day_position: u32,
    pub care_type: String,
    pub stay_type: StayType,
    pub speciality: Option<String>,
    pub census: f64,
    pub revenue: f64,
}

/// One generated day of a budget row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub branch_id: BranchId,
    pub date: NaiveDate,
    pub quarter: u8,
    pub care_type: String,
    pub stay_type: StayType,
    pub speciality: Option<String>,
    pub census: Decimal,
    pub episodes: Decimal,
    /// Budgeted cost per episode, carried unchanged from the budget row
    pub cpe: Decimal,
    /// Average length of stay, carried unchanged from the budget row
    pub alos: Decimal,
    pub revenue: Decimal,
}
