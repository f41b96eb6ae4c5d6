//! Day-position weights derived from historical actuals

use super::records::{ActualRow, BudgetRow, StayType};
use crate::types::{quarter_of_month, BranchId};
use std::collections::{BTreeMap, HashMap};

/// Revenue and census share of one (month, weekday position, speciality) slot
/// within its (branch, care type, stay type, quarter) group
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry {
    pub branch_id: BranchId,
    pub quarter: u8,
    pub care_type: String,
    pub stay_type: StayType,
    pub month: u32,
    pub day_position: u32,
    pub speciality: Option<String>,
    pub revenue_weight: f64,
    pub census_weight: f64,
}

/// Slot key inside a matched group: (month, weekday position, speciality)
pub type SlotKey = (u32, u32, Option<String>);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlotWeight {
    pub revenue: f64,
    pub census: f64,
}

#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
}

type GroupKey<'a> = (BranchId, &'a str, StayType, u8);

impl WeightTable {
    /// Weight each actual row against its group total.
    ///
    /// A group with no revenue (or no census) gives its rows a zero weight for
    /// that measure.
    pub fn from_actuals(actuals: &[ActualRow]) -> Self {
        let mut totals: HashMap<GroupKey<'_>, (f64, f64)> = HashMap::new();
        for row in actuals {
            let total = totals.entry(group_key(row)).or_default();
            total.0 += row.revenue;
            total.1 += row.census;
        }

        let entries = actuals
            .iter()
            .map(|row| {
                let (revenue_total, census_total) = totals.get(&group_key(row)).copied().unwrap_or_default();
                WeightEntry {
                    branch_id: row.branch_id,
                    quarter: quarter_of_month(row.month),
                    care_type: row.care_type.clone(),
                    stay_type: row.stay_type,
                    month: row.month,
                    day_position: row.day_position,
                    speciality: row.speciality.clone(),
                    revenue_weight: share(row.revenue, revenue_total),
                    census_weight: share(row.census, census_total),
                }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots that apply to a budget row.
    ///
    /// Matches branch, care type, stay type and quarter; long-stay rows take every
    /// speciality, other rows only their own. A repeated slot keeps the last entry.
    pub fn matching(&self, row: &BudgetRow) -> BTreeMap<SlotKey, SlotWeight> {
        let quarter = row.effective_quarter();
        self.entries
            .iter()
            .filter(|e| {
                e.branch_id == row.branch_id
                    && e.care_type == row.care_type
                    && e.stay_type == row.stay_type
                    && e.quarter == quarter
                    && (row.stay_type.is_long_stay() || e.speciality == row.speciality)
            })
            .map(|e| {
                (
                    (e.month, e.day_position, e.speciality.clone()),
                    SlotWeight {
                        revenue: e.revenue_weight,
                        census: e.census_weight,
                    },
                )
            })
            .collect()
    }
}

fn group_key(row: &ActualRow) -> GroupKey<'_> {
    (row.branch_id, row.care_type.as_str(), row.stay_type, quarter_of_month(row.month))
}

fn share(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal::Decimal;

    fn actual(month: u32, position: u32, stay_type: StayType, speciality: &str, census: f64, revenue: f64) -> ActualRow {
        ActualRow {
            branch_id: 1,
            month,
            day_position: position,
            care_type: "IP".into(),
            stay_type,
            speciality: Some(speciality.into()),
            census,
            revenue,
        }
    }

    fn budget(stay_type: StayType, speciality: Option<&str>) -> BudgetRow {
        BudgetRow {
            branch_id: 1,
            year: 2025,
            quarter: 1,
            month: None,
            care_type: "IP".into(),
            stay_type,
            speciality: speciality.map(String::from),
            census: Decimal::ZERO,
            episodes: Decimal::ZERO,
            cpe: Decimal::ZERO,
            alos: Decimal::ZERO,
            revenue: Decimal::ZERO,
        }
    }

    #[test]
    fn test_weights_within_quarter_group() {
        let table = WeightTable::from_actuals(&[
            actual(1, 1, StayType::NonLtc, "Cardiology", 2.0, 300.0),
            actual(2, 1, StayType::NonLtc, "Cardiology", 6.0, 100.0),
            // Different quarter, own group
            actual(4, 1, StayType::NonLtc, "Cardiology", 1.0, 50.0),
        ]);
        let e = table.entries();
        assert_relative_eq!(e[0].revenue_weight, 0.75);
        assert_relative_eq!(e[1].revenue_weight, 0.25);
        assert_relative_eq!(e[0].census_weight, 0.25);
        assert_relative_eq!(e[2].revenue_weight, 1.0);
        assert_eq!(e[2].quarter, 2);
    }

    #[test]
    fn test_zero_group_total_gives_zero_weight() {
        let table = WeightTable::from_actuals(&[actual(1, 1, StayType::Op, "ENT", 0.0, 0.0)]);
        assert_eq!(table.entries()[0].revenue_weight, 0.0);
        assert_eq!(table.entries()[0].census_weight, 0.0);
    }

    #[test]
    fn test_matching_by_speciality() {
        let table = WeightTable::from_actuals(&[
            actual(1, 1, StayType::NonLtc, "Cardiology", 1.0, 100.0),
            actual(1, 1, StayType::NonLtc, "Surgery", 1.0, 100.0),
            actual(1, 2, StayType::Ltc, "Cardiology", 1.0, 100.0),
            actual(1, 2, StayType::Ltc, "Surgery", 1.0, 100.0),
        ]);

        let cardiology = table.matching(&budget(StayType::NonLtc, Some("Cardiology")));
        assert_eq!(cardiology.len(), 1);
        assert!(cardiology.contains_key(&(1, 1, Some("Cardiology".to_string()))));

        // Long stay takes every speciality
        assert_eq!(table.matching(&budget(StayType::Ltc, None)).len(), 2);
        assert!(table.matching(&budget(StayType::Er, None)).is_empty());
    }
}
