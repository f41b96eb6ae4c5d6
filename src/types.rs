//! Identifiers shared by every stage: branches, scenarios, periods and horizons

use crate::error::{BudgetError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Branch identifier as used by the upstream revenue and assumption stores
pub type BranchId = u8;

/// Planning scenario an assumption set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    MostLikely,
    BestCase,
    WorstCase,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::MostLikely, Scenario::BestCase, Scenario::WorstCase];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::MostLikely => "most_likely",
            Scenario::BestCase => "best_case",
            Scenario::WorstCase => "worst_case",
        }
    }
}

impl FromStr for Scenario {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == s.trim())
            .ok_or_else(|| BudgetError::UnknownScenario(s.to_string()))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reporting period within a horizon (1-indexed: month 1-12 or day-of-year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(pub u16);

impl Period {
    /// Zero-based slot for period-indexed vectors
    pub fn index(&self) -> usize {
        usize::from(self.0.saturating_sub(1))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reporting horizon of a branch/scenario/year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Horizon {
    /// Twelve calendar months
    #[default]
    Monthly,
    /// Every calendar day of the year
    Daily { year: i32 },
}

impl Horizon {
    /// Number of periods in the horizon
    pub fn len(&self) -> u16 {
        match self {
            Horizon::Monthly => 12,
            Horizon::Daily { year } => days_in_year(*year),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, period: Period) -> bool {
        period.0 >= 1 && period.0 <= self.len()
    }

    /// Reject a period that does not belong to this horizon
    pub fn check(&self, period: Period) -> Result<Period> {
        if self.contains(period) {
            Ok(period)
        } else {
            Err(BudgetError::PeriodOutOfRange { period: period.0, horizon: self.len() })
        }
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> {
        (1..=self.len()).map(Period)
    }

    /// Calendar date of a daily period
    pub fn date_of(&self, period: Period) -> Option<NaiveDate> {
        match self {
            Horizon::Monthly => None,
            Horizon::Daily { year } => NaiveDate::from_yo_opt(*year, u32::from(period.0)),
        }
    }

    /// Calendar month (1-12) a period falls in
    pub fn month_of(&self, period: Period) -> u32 {
        match self {
            Horizon::Monthly => u32::from(period.0),
            Horizon::Daily { .. } => self.date_of(period).map(|d| d.month()).unwrap_or(12),
        }
    }

    /// Periods making up a quarter (1-4, clamped)
    pub fn quarter(&self, quarter: u8) -> RangeInclusive<Period> {
        let q = u16::from(quarter.clamp(1, 4));
        match self {
            Horizon::Monthly => Period(q * 3 - 2)..=Period(q * 3),
            Horizon::Daily { year } => {
                let first_month = u32::from(q) * 3 - 2;
                let start = NaiveDate::from_ymd_opt(*year, first_month, 1)
                    .map(|d| d.ordinal() as u16)
                    .unwrap_or(1);
                let end = if q == 4 {
                    days_in_year(*year)
                } else {
                    NaiveDate::from_ymd_opt(*year, first_month + 3, 1)
                        .map(|d| d.ordinal() as u16 - 1)
                        .unwrap_or(start)
                };
                Period(start)..=Period(end)
            }
        }
    }
}

/// Quarter (1-4) of a calendar month
pub fn quarter_of_month(month: u32) -> u8 {
    (month.clamp(1, 12).saturating_sub(1) / 3 + 1) as u8
}

pub fn days_in_year(year: i32) -> u16 {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|d| d.ordinal() as u16)
        .unwrap_or(365)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(30)
}
