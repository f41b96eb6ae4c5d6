//! Spread budget rows to daily records

use super::allocate::{allocate_exact, round_total};
use super::calendar::{weekday_position, DayCalendar};
use super::records::{BudgetRow, DailyRecord, StayType};
use super::weights::WeightTable;
use crate::types::{quarter_of_month, BranchId};
use chrono::{Datelike, NaiveDate};
use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One day (and, for long-stay rows, one speciality) of a row's span
#[derive(Debug, Clone)]
struct Slot {
    date: NaiveDate,
    speciality: Option<String>,
    revenue_weight: f64,
    census_weight: f64,
}

/// Revenue and census sums used to check a distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistributionTotals {
    pub revenue: Decimal,
    pub census: Decimal,
}

/// Result of distributing a set of budget rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyDistribution {
    /// One record per budget row, day and speciality slot
    pub detail: Vec<DailyRecord>,
    /// Detail rolled up per (date, branch, care type, stay type, speciality)
    pub daily: Vec<DailyRecord>,
    /// Budget row totals, rounded as distributed
    pub source_totals: DistributionTotals,
    pub distributed_totals: DistributionTotals,
}

#[derive(Debug, Clone)]
pub struct Distributor {
    calendar: DayCalendar,
    weights: WeightTable,
    decimals: u32,
}

impl Distributor {
    pub fn new(calendar: DayCalendar, weights: WeightTable, decimals: u32) -> Self {
        Self {
            calendar,
            weights,
            decimals,
        }
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Spread one budget row over the days of its span.
    ///
    /// Revenue follows revenue weights; census and episodes follow census weights.
    /// Each measure sums exactly to the row's value rounded to `decimals`.
    pub fn distribute_row(&self, row: &BudgetRow) -> Vec<DailyRecord> {
        let days = row.days();
        if days.is_empty() {
            return Vec::new();
        }

        let slots = self
            .weighted_slots(row, &days)
            .unwrap_or_else(|| self.calendar_slots(row, &days));

        let revenue_weights: Vec<f64> = slots.iter().map(|s| s.revenue_weight).collect();
        let census_weights: Vec<f64> = if slots.iter().any(|s| s.census_weight > 0.0) {
            slots.iter().map(|s| s.census_weight).collect()
        } else {
            revenue_weights.clone()
        };

        let revenue = allocate_exact(row.revenue, &revenue_weights, self.decimals);
        let census = allocate_exact(row.census, &census_weights, self.decimals);
        let episodes = allocate_exact(row.episodes, &census_weights, self.decimals);

        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| DailyRecord {
                branch_id: row.branch_id,
                date: slot.date,
                quarter: quarter_of_month(slot.date.month()),
                care_type: row.care_type.clone(),
                stay_type: row.stay_type,
                speciality: slot.speciality,
                census: census[i],
                episodes: episodes[i],
                cpe: row.cpe,
                alos: row.alos,
                revenue: revenue[i],
            })
            .collect()
    }

    /// Historical weights times calendar factor, or `None` when nothing usable matched
    fn weighted_slots(&self, row: &BudgetRow, days: &[NaiveDate]) -> Option<Vec<Slot>> {
        let matched = self.weights.matching(row);
        if matched.is_empty() {
            return None;
        }

        let mut slots = Vec::new();
        for date in days {
            let factor = self.calendar.factor(*date);
            let position = weekday_position(*date);
            for ((month, day_position, speciality), weight) in &matched {
                if *month != date.month() || *day_position != position {
                    continue;
                }
                slots.push(Slot {
                    date: *date,
                    speciality: if row.stay_type.is_long_stay() {
                        speciality.clone()
                    } else {
                        row.speciality.clone()
                    },
                    revenue_weight: weight.revenue * factor,
                    census_weight: weight.census * factor,
                });
            }
        }

        if slots.iter().any(|s| s.revenue_weight > 0.0) {
            Some(slots)
        } else {
            debug!(
                "Branch {} {} {}: matched weights carry no revenue, using calendar factors",
                row.branch_id, row.care_type, row.stay_type
            );
            None
        }
    }

    /// One slot per day weighted by its calendar factor
    fn calendar_slots(&self, row: &BudgetRow, days: &[NaiveDate]) -> Vec<Slot> {
        days.iter()
            .map(|date| {
                let factor = self.calendar.factor(*date);
                Slot {
                    date: *date,
                    speciality: row.speciality.clone(),
                    revenue_weight: factor,
                    census_weight: factor,
                }
            })
            .collect()
    }

    /// Distribute every row in parallel; detail keeps row order
    pub fn distribute(&self, rows: &[BudgetRow]) -> DailyDistribution {
        let detail: Vec<DailyRecord> = rows
            .par_iter()
            .map(|row| self.distribute_row(row))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        let source_totals = DistributionTotals {
            revenue: rows.iter().map(|r| round_total(r.revenue, self.decimals)).sum(),
            census: rows.iter().map(|r| round_total(r.census, self.decimals)).sum(),
        };
        let daily = roll_up(&detail);
        let distributed_totals = DistributionTotals {
            revenue: daily.iter().map(|r| r.revenue).sum(),
            census: daily.iter().map(|r| r.census).sum(),
        };

        debug!(
            "Distributed {} budget rows into {} detail and {} daily records",
            rows.len(),
            detail.len(),
            daily.len()
        );

        DailyDistribution {
            detail,
            daily,
            source_totals,
            distributed_totals,
        }
    }
}

type RollUpKey = (NaiveDate, BranchId, String, StayType, Option<String>);

/// Sum detail records per (date, branch, care type, stay type, speciality).
///
/// CPE and ALOS are not additive; the last record's values are kept.
pub fn roll_up(detail: &[DailyRecord]) -> Vec<DailyRecord> {
    let mut groups: BTreeMap<RollUpKey, DailyRecord> = BTreeMap::new();
    for record in detail {
        let key = (
            record.date,
            record.branch_id,
            record.care_type.clone(),
            record.stay_type,
            record.speciality.clone(),
        );
        groups
            .entry(key)
            .and_modify(|total| {
                total.census += record.census;
                total.episodes += record.episodes;
                total.revenue += record.revenue;
                total.cpe = record.cpe;
                total.alos = record.alos;
            })
            .or_insert_with(|| record.clone());
    }
    groups.into_values().collect()
}
