//! Run configuration, loadable from JSON with per-field defaults

use crate::distribution::{CalendarFactors, DayCalendar, HolidayCalendar};
use crate::error::Result;
use crate::types::{BranchId, Horizon, Scenario};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default reporting year
pub const DEFAULT_YEAR: i32 = 2025;

/// Decimal places for displayed currency amounts
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 2;

/// Decimal places for distributed daily amounts
pub const DEFAULT_DISTRIBUTION_DECIMALS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
}

impl Branch {
    pub fn new(id: BranchId, name: &str) -> Self {
        Self { id, name: name.to_string() }
    }
}

/// The six branches the budget is prepared for
pub fn default_branches() -> Vec<Branch> {
    vec![
        Branch::new(1, "Riyadh"),
        Branch::new(2, "Khamis"),
        Branch::new(3, "Jazan"),
        Branch::new(4, "Qassem"),
        Branch::new(5, "Madinah"),
        Branch::new(6, "Abha"),
    ]
}

/// Period granularity of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonKind {
    #[default]
    Monthly,
    Daily,
}

/// Income statement run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_year")]
    pub year: i32,

    #[serde(default)]
    pub scenario: Scenario,

    #[serde(default)]
    pub horizon: HorizonKind,

    #[serde(default = "default_branches")]
    pub branches: Vec<Branch>,

    /// Rounding for presentation only; totals are computed unrounded
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,

    /// Calendar used to spread monthly revenue in a daily run
    #[serde(default)]
    pub distribution: DistributionConfig,
}

fn default_year() -> i32 { DEFAULT_YEAR }
fn default_display_decimals() -> u32 { DEFAULT_DISPLAY_DECIMALS }
fn default_distribution_decimals() -> u32 { DEFAULT_DISTRIBUTION_DECIMALS }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR,
            scenario: Scenario::default(),
            horizon: HorizonKind::default(),
            branches: default_branches(),
            display_decimals: DEFAULT_DISPLAY_DECIMALS,
            distribution: DistributionConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn horizon(&self) -> Horizon {
        match self.horizon {
            HorizonKind::Monthly => Horizon::Monthly,
            HorizonKind::Daily => Horizon::Daily { year: self.year },
        }
    }

    pub fn branch_ids(&self) -> Vec<BranchId> {
        self.branches.iter().map(|b| b.id).collect()
    }

    pub fn branch_name(&self, id: BranchId) -> Option<&str> {
        self.branches.iter().find(|b| b.id == id).map(|b| b.name.as_str())
    }
}

/// Daily distribution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default)]
    pub factors: CalendarFactors,

    #[serde(default)]
    pub calendar: HolidayCalendar,

    #[serde(default = "default_distribution_decimals")]
    pub decimals: u32,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            factors: CalendarFactors::default(),
            calendar: HolidayCalendar::default(),
            decimals: DEFAULT_DISTRIBUTION_DECIMALS,
        }
    }
}

impl DistributionConfig {
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn day_calendar(&self) -> DayCalendar {
        DayCalendar::new(self.factors, self.calendar.clone())
    }
}
