//! Revenue data structures matching the upstream revenue feed

use crate::error::{BudgetError, Result};
use crate::types::{BranchId, Period};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Care type a revenue figure is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CareType {
    /// Inpatient
    #[serde(rename = "IP")]
    Ip,
    /// Outpatient
    #[serde(rename = "OP")]
    Op,
    /// Emergency
    #[serde(rename = "ER")]
    Er,
}

impl CareType {
    pub const ALL: [CareType; 3] = [CareType::Ip, CareType::Op, CareType::Er];

    pub fn as_str(&self) -> &'static str {
        match self {
            CareType::Ip => "IP",
            CareType::Op => "OP",
            CareType::Er => "ER",
        }
    }
}

impl FromStr for CareType {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IP" => Ok(CareType::Ip),
            "OP" => Ok(CareType::Op),
            "ER" => Ok(CareType::Er),
            _ => Err(BudgetError::UnknownCareType(s.to_string())),
        }
    }
}

impl fmt::Display for CareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One revenue amount as delivered by the revenue provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueFigure {
    pub branch_id: BranchId,
    pub period: Period,
    pub care_type: CareType,
    pub amount: f64,
}

/// Revenue of one branch for one period, by care type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodRevenue {
    pub ip: f64,
    pub op: f64,
    pub er: f64,
}

impl PeriodRevenue {
    pub fn new(ip: f64, op: f64, er: f64) -> Self {
        Self { ip, op, er }
    }

    pub fn amount(&self, care_type: CareType) -> f64 {
        match care_type {
            CareType::Ip => self.ip,
            CareType::Op => self.op,
            CareType::Er => self.er,
        }
    }

    /// Add to a care type; repeated figures for the same slot accumulate
    pub fn add(&mut self, care_type: CareType, amount: f64) {
        match care_type {
            CareType::Ip => self.ip += amount,
            CareType::Op => self.op += amount,
            CareType::Er => self.er += amount,
        }
    }

    pub fn total(&self) -> f64 {
        self.ip + self.op + self.er
    }
}

/// Revenue of one branch across its horizon; missing periods read as zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueSeries {
    periods: BTreeMap<Period, PeriodRevenue>,
}

impl RevenueSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_figures<'a>(figures: impl IntoIterator<Item = &'a RevenueFigure>) -> Self {
        let mut series = Self::new();
        for figure in figures {
            series.add(figure.period, figure.care_type, figure.amount);
        }
        series
    }

    pub fn add(&mut self, period: Period, care_type: CareType, amount: f64) {
        self.periods.entry(period).or_default().add(care_type, amount);
    }

    pub fn set_period(&mut self, period: Period, revenue: PeriodRevenue) {
        self.periods.insert(period, revenue);
    }

    pub fn period(&self, period: Period) -> PeriodRevenue {
        self.periods.get(&period).copied().unwrap_or_default()
    }

    /// Periods that carry data, in order
    pub fn iter(&self) -> impl Iterator<Item = (Period, &PeriodRevenue)> {
        self.periods.iter().map(|(p, r)| (*p, r))
    }

    pub fn total(&self, care_type: CareType) -> f64 {
        self.periods.values().map(|r| r.amount(care_type)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_period_is_zero() {
        let series = RevenueSeries::new();
        assert_eq!(series.period(Period(5)), PeriodRevenue::default());
        assert_eq!(series.period(Period(5)).total(), 0.0);
    }

    #[test]
    fn test_figures_accumulate() {
        let figures = [
            RevenueFigure { branch_id: 1, period: Period(1), care_type: CareType::Ip, amount: 100.0 },
            RevenueFigure { branch_id: 1, period: Period(1), care_type: CareType::Ip, amount: 50.0 },
            RevenueFigure { branch_id: 1, period: Period(1), care_type: CareType::Er, amount: 10.0 },
            RevenueFigure { branch_id: 1, period: Period(2), care_type: CareType::Op, amount: 20.0 },
        ];
        let series = RevenueSeries::from_figures(&figures);

        assert_eq!(series.period(Period(1)), PeriodRevenue::new(150.0, 0.0, 10.0));
        assert_eq!(series.period(Period(2)).op, 20.0);
        assert_eq!(series.total(CareType::Ip), 150.0);
        assert_eq!(series.iter().count(), 2);
    }

    #[test]
    fn test_care_type_parse() {
        assert_eq!("ip".parse::<CareType>().unwrap(), CareType::Ip);
        assert_eq!(" ER".parse::<CareType>().unwrap(), CareType::Er);
        assert!("LTC".parse::<CareType>().is_err());
    }
}
