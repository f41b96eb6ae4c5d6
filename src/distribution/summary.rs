//! Reconciliation of daily records back to months, quarters and the year

use super::records::{DailyRecord, StayType};
use crate::error::{BudgetError, Result};
use crate::types::quarter_of_month;
use chrono::Datelike;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodGrain {
    #[default]
    Month,
    Quarter,
    Year,
}

impl PeriodGrain {
    /// Bucket a date falls in: month 1-12, quarter 1-4, or the year itself
    pub fn bucket(&self, date: chrono::NaiveDate) -> i32 {
        match self {
            PeriodGrain::Month => date.month() as i32,
            PeriodGrain::Quarter => i32::from(quarter_of_month(date.month())),
            PeriodGrain::Year => date.year(),
        }
    }
}

impl FromStr for PeriodGrain {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(PeriodGrain::Month),
            "quarter" | "quarterly" => Ok(PeriodGrain::Quarter),
            "year" | "yearly" | "annual" => Ok(PeriodGrain::Year),
            _ => Err(BudgetError::UnknownGrain(s.to_string())),
        }
    }
}

/// How a stay type's cost per unit is reconstructed after aggregation.
///
/// The two rules are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationRule {
    /// Mean of the positive budgeted cost-per-unit values
    AverageCostPerUnit,
    /// Summed revenue over summed episodes
    RevenuePerEpisode,
}

impl ReconciliationRule {
    pub fn for_stay_type(stay_type: StayType) -> Self {
        match stay_type {
            StayType::Ltc => ReconciliationRule::AverageCostPerUnit,
            StayType::NonLtc | StayType::Op | StayType::Er => ReconciliationRule::RevenuePerEpisode,
        }
    }
}

/// Totals for one period bucket and stay type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub grain: PeriodGrain,
    pub bucket: i32,
    pub stay_type: StayType,
    pub rule: ReconciliationRule,
    pub revenue: Decimal,
    pub census: Decimal,
    pub episodes: Decimal,
    pub cost_per_unit: Decimal,
    pub alos: Decimal,
    pub records: usize,
}

#[derive(Default)]
struct Accumulator {
    revenue: Decimal,
    census: Decimal,
    episodes: Decimal,
    cpe_sum: Decimal,
    cpe_count: u32,
    alos_sum: Decimal,
    alos_count: u32,
    records: usize,
}

impl Accumulator {
    fn add(&mut self, record: &DailyRecord) {
        self.revenue += record.revenue;
        self.census += record.census;
        self.episodes += record.episodes;
        if record.cpe > Decimal::ZERO {
            self.cpe_sum += record.cpe;
            self.cpe_count += 1;
        }
        if record.alos > Decimal::ZERO {
            self.alos_sum += record.alos;
            self.alos_count += 1;
        }
        self.records += 1;
    }
}

fn mean(sum: Decimal, count: u32) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    }
}

/// Sum daily records per period bucket and stay type, in bucket order.
///
/// Derived ratios are rounded to `decimals` places.
pub fn summarize(records: &[DailyRecord], grain: PeriodGrain, decimals: u32) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(i32, StayType), Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry((grain.bucket(record.date), record.stay_type))
            .or_default()
            .add(record);
    }

    groups
        .into_iter()
        .map(|((bucket, stay_type), acc)| {
            let rule = ReconciliationRule::for_stay_type(stay_type);
            let cost_per_unit = match rule {
                ReconciliationRule::AverageCostPerUnit => mean(acc.cpe_sum, acc.cpe_count),
                ReconciliationRule::RevenuePerEpisode => acc.revenue.checked_div(acc.episodes).unwrap_or_default(),
            };
            SummaryRow {
                grain,
                bucket,
                stay_type,
                rule,
                revenue: acc.revenue,
                census: acc.census,
                episodes: acc.episodes,
                cost_per_unit: cost_per_unit.round_dp(decimals),
                alos: mean(acc.alos_sum, acc.alos_count).round_dp(decimals),
                records: acc.records,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(month: u32, day: u32, stay_type: StayType, revenue: Decimal, episodes: Decimal, cpe: Decimal) -> DailyRecord {
        DailyRecord {
            branch_id: 1,
            date: NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
            quarter: quarter_of_month(month),
            care_type: "IP".into(),
            stay_type,
            speciality: None,
            census: dec!(1),
            episodes,
            cpe,
            alos: dec!(4),
            revenue,
        }
    }

    #[test]
    fn test_rules_by_stay_type() {
        assert_eq!(ReconciliationRule::for_stay_type(StayType::Ltc), ReconciliationRule::AverageCostPerUnit);
        for stay in [StayType::NonLtc, StayType::Op, StayType::Er] {
            assert_eq!(ReconciliationRule::for_stay_type(stay), ReconciliationRule::RevenuePerEpisode);
        }
    }

    #[test]
    fn test_long_stay_averages_cost_per_unit() {
        let records = [
            record(1, 1, StayType::Ltc, dec!(1000), dec!(1), dec!(900)),
            record(1, 2, StayType::Ltc, dec!(3000), dec!(1), dec!(1100)),
            // Zero CPE is not part of the average
            record(1, 3, StayType::Ltc, dec!(500), dec!(1), dec!(0)),
        ];
        let rows = summarize(&records, PeriodGrain::Month, 4);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cost_per_unit, dec!(1000));
        assert_eq!(rows[0].revenue, dec!(4500));
        assert_eq!(rows[0].records, 3);
    }

    #[test]
    fn test_short_stay_uses_revenue_over_episodes() {
        let records = [
            record(2, 1, StayType::Op, dec!(1000), dec!(3), dec!(900)),
            record(2, 2, StayType::Op, dec!(2000), dec!(1), dec!(100)),
        ];
        let rows = summarize(&records, PeriodGrain::Month, 4);
        assert_eq!(rows[0].cost_per_unit, dec!(750));
        assert_eq!(rows[0].alos, dec!(4));

        let no_episodes = [record(2, 1, StayType::Er, dec!(1000), dec!(0), dec!(900))];
        assert_eq!(summarize(&no_episodes, PeriodGrain::Month, 4)[0].cost_per_unit, Decimal::ZERO);
    }

    #[test]
    fn test_grains() {
        let records = [
            record(1, 15, StayType::Op, dec!(10), dec!(1), dec!(0)),
            record(3, 15, StayType::Op, dec!(20), dec!(1), dec!(0)),
            record(4, 15, StayType::Op, dec!(40), dec!(1), dec!(0)),
        ];
        assert_eq!(summarize(&records, PeriodGrain::Month, 4).len(), 3);

        let quarters = summarize(&records, PeriodGrain::Quarter, 4);
        assert_eq!(quarters.len(), 2);
        assert_eq!(quarters[0].bucket, 1);
        assert_eq!(quarters[0].revenue, dec!(30));

        let year = summarize(&records, PeriodGrain::Year, 4);
        assert_eq!(year[0].bucket, 2025);
        assert_eq!(year[0].revenue, dec!(70));
    }

    #[test]
    fn test_grain_parse() {
        assert_eq!("Quarter".parse::<PeriodGrain>().unwrap(), PeriodGrain::Quarter);
        assert!(matches!("week".parse::<PeriodGrain>(), Err(BudgetError::UnknownGrain(_))));
    }
}
