//! CSV loading for budget rows and historical actuals

use super::records::{ActualRow, BudgetRow, StayType};
use crate::assumptions::percent::{parse_decimal, parse_number};
use crate::error::{BudgetError, Result};
use crate::types::{quarter_of_month, BranchId};
use csv::Reader;
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

/// Raw CSV row matching budget_rows.csv columns
#[derive(Debug, serde::Deserialize)]
struct BudgetCsvRow {
    #[serde(rename = "BranchId")]
    branch_id: BranchId,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Quarter")]
    quarter: u8,
    #[serde(rename = "Month", default)]
    month: Option<u32>,
    #[serde(rename = "CareType")]
    care_type: String,
    #[serde(rename = "StayType")]
    stay_type: String,
    #[serde(rename = "Speciality", default)]
    speciality: Option<String>,
    #[serde(rename = "Census", default)]
    census: String,
    #[serde(rename = "Episodes", default)]
    episodes: String,
    #[serde(rename = "CPE", default)]
    cpe: String,
    #[serde(rename = "ALOS", default)]
    alos: String,
    #[serde(rename = "Revenue", default)]
    revenue: String,
}

impl BudgetCsvRow {
    fn to_budget_row(self) -> Result<BudgetRow> {
        if !(1..=4).contains(&self.quarter) {
            return Err(BudgetError::PeriodOutOfRange {
                period: u16::from(self.quarter),
                horizon: 4,
            });
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(BudgetError::PeriodOutOfRange {
                    period: month as u16,
                    horizon: 12,
                });
            }
            if quarter_of_month(month) != self.quarter {
                warn!(
                    "Branch {}: month {} is not in quarter {}; using the month's quarter",
                    self.branch_id, month, self.quarter
                );
            }
        }

        Ok(BudgetRow {
            branch_id: self.branch_id,
            year: self.year,
            quarter: self.month.map(quarter_of_month).unwrap_or(self.quarter),
            month: self.month,
            stay_type: self.stay_type.parse::<StayType>()?,
            care_type: self.care_type.trim().to_string(),
            speciality: non_blank(self.speciality),
            census: parse_decimal("Census", &self.census)?,
            episodes: parse_decimal("Episodes", &self.episodes)?,
            cpe: parse_decimal("CPE", &self.cpe)?,
            alos: parse_decimal("ALOS", &self.alos)?,
            revenue: parse_decimal("Revenue", &self.revenue)?,
        })
    }
}

/// Raw CSV row matching actuals.csv columns
#[derive(Debug, serde::Deserialize)]
struct ActualCsvRow {
    #[serde(rename = "BranchId")]
    branch_id: BranchId,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "DayPosition")]
    day_position: u32,
    #[serde(rename = "CareType")]
    care_type: String,
    #[serde(rename = "StayType")]
    stay_type: String,
    #[serde(rename = "Speciality", default)]
    speciality: Option<String>,
    #[serde(rename = "Census", default)]
    census: String,
    #[serde(rename = "Revenue", default)]
    revenue: String,
}

impl ActualCsvRow {
    fn to_actual(self) -> Result<ActualRow> {
        if !(1..=12).contains(&self.month) {
            return Err(BudgetError::PeriodOutOfRange {
                period: self.month as u16,
                horizon: 12,
            });
        }
        if !(1..=5).contains(&self.day_position) {
            return Err(BudgetError::PeriodOutOfRange {
                period: self.day_position as u16,
                horizon: 5,
            });
        }

        Ok(ActualRow {
            branch_id: self.branch_id,
            month: self.month,
            day_position: self.day_position,
            stay_type: self.stay_type.parse::<StayType>()?,
            care_type: self.care_type.trim().to_string(),
            speciality: non_blank(self.speciality),
            census: parse_number("Census", &self.census)?,
            revenue: parse_number("Revenue", &self.revenue)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Load budget rows for one year, optionally restricted to a quarter and branch
pub fn load_budget_rows_from_reader<R: Read>(
    reader: R,
    year: i32,
    quarter: Option<u8>,
    branch_id: Option<BranchId>,
) -> Result<Vec<BudgetRow>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let raw: BudgetCsvRow = result?;
        let row = raw.to_budget_row()?;
        if row.year != year
            || quarter.is_some_and(|q| q != row.quarter)
            || branch_id.is_some_and(|b| b != row.branch_id)
        {
            continue;
        }
        rows.push(row);
    }

    debug!("Loaded {} budget rows for {}", rows.len(), year);
    Ok(rows)
}

/// Load budget rows from a CSV file
pub fn load_budget_rows<P: AsRef<Path>>(
    path: P,
    year: i32,
    quarter: Option<u8>,
    branch_id: Option<BranchId>,
) -> Result<Vec<BudgetRow>> {
    let file = std::fs::File::open(path)?;
    load_budget_rows_from_reader(file, year, quarter, branch_id)
}

/// Load historical actuals used for weights
pub fn load_actuals_from_reader<R: Read>(reader: R) -> Result<Vec<ActualRow>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        let raw: ActualCsvRow = result?;
        rows.push(raw.to_actual()?);
    }
    debug!("Loaded {} historical actual rows", rows.len());
    Ok(rows)
}

/// Load historical actuals from a CSV file
pub fn load_actuals<P: AsRef<Path>>(path: P) -> Result<Vec<ActualRow>> {
    let file = std::fs::File::open(path)?;
    load_actuals_from_reader(file)
}
