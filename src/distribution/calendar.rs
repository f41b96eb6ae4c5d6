//! Calendar factors for spreading budgets to days
//!
//! Hijri-derived dates (Ramadan, the two Eids, other religious holidays) are not
//! computed here; they arrive as Gregorian date ranges from configuration.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Fixed Gregorian national holidays as (month, day): Founding Day and National Day
pub const NATIONAL_HOLIDAYS: [(u32, u32); 2] = [(2, 22), (9, 23)];

/// Classification of a calendar day, in descending priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    EidAdha,
    EidFitr,
    NationalHoliday,
    Holiday,
    Ramadan,
    Friday,
    Saturday,
    Weekday,
}

/// Activity multiplier per day type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarFactors {
    pub weekday: f64,
    pub friday: f64,
    pub saturday: f64,
    pub holiday: f64,
    pub ramadan: f64,
    pub eid_fitr: f64,
    pub eid_adha: f64,
}

impl Default for CalendarFactors {
    fn default() -> Self {
        Self {
            weekday: 1.0,
            friday: 0.5,
            saturday: 0.6,
            holiday: 0.5,
            ramadan: 0.7,
            eid_fitr: 0.3,
            eid_adha: 0.3,
        }
    }
}

impl CalendarFactors {
    pub fn factor(&self, day_type: DayType) -> f64 {
        match day_type {
            DayType::EidAdha => self.eid_adha,
            DayType::EidFitr => self.eid_fitr,
            DayType::NationalHoliday | DayType::Holiday => self.holiday,
            DayType::Ramadan => self.ramadan,
            DayType::Friday => self.friday,
            DayType::Saturday => self.saturday,
            DayType::Weekday => self.weekday,
        }
    }
}

/// Inclusive Gregorian date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Externally supplied special periods
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayCalendar {
    pub ramadan: Vec<DateRange>,
    pub eid_fitr: Vec<DateRange>,
    pub eid_adha: Vec<DateRange>,
    /// Other Hijri-derived public holidays
    pub holidays: Vec<NaiveDate>,
}

impl HolidayCalendar {
    pub fn classify(&self, date: NaiveDate) -> DayType {
        if in_any(&self.eid_adha, date) {
            return DayType::EidAdha;
        }
        if in_any(&self.eid_fitr, date) {
            return DayType::EidFitr;
        }
        if NATIONAL_HOLIDAYS.contains(&(date.month(), date.day())) {
            return DayType::NationalHoliday;
        }
        if self.holidays.contains(&date) {
            return DayType::Holiday;
        }
        if in_any(&self.ramadan, date) {
            return DayType::Ramadan;
        }
        match date.weekday() {
            Weekday::Fri => DayType::Friday,
            Weekday::Sat => DayType::Saturday,
            _ => DayType::Weekday,
        }
    }
}

fn in_any(ranges: &[DateRange], date: NaiveDate) -> bool {
    ranges.iter().any(|range| range.contains(date))
}

/// Factors bound to a holiday calendar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayCalendar {
    pub factors: CalendarFactors,
    pub holidays: HolidayCalendar,
}

impl DayCalendar {
    pub fn new(factors: CalendarFactors, holidays: HolidayCalendar) -> Self {
        Self { factors, holidays }
    }

    pub fn classify(&self, date: NaiveDate) -> DayType {
        self.holidays.classify(date)
    }

    pub fn factor(&self, date: NaiveDate) -> f64 {
        self.factors.factor(self.classify(date))
    }
}

/// Which occurrence of its weekday a date is within the month (1-5)
pub fn weekday_position(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// Every date of a month, in order
pub fn month_days(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first.iter_days().take_while(|d| d.month() == month).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar_2025() -> HolidayCalendar {
        HolidayCalendar {
            ramadan: vec![DateRange::new(date(2025, 3, 1), date(2025, 3, 29))],
            eid_fitr: vec![DateRange::new(date(2025, 3, 30), date(2025, 4, 1))],
            eid_adha: vec![DateRange::new(date(2025, 6, 5), date(2025, 6, 9))],
            holidays: vec![date(2025, 6, 26)],
        }
    }

    #[test]
    fn test_day_of_week() {
        let calendar = HolidayCalendar::default();
        // 2025-01-03 is a Friday
        assert_eq!(calendar.classify(date(2025, 1, 3)), DayType::Friday);
        assert_eq!(calendar.classify(date(2025, 1, 4)), DayType::Saturday);
        assert_eq!(calendar.classify(date(2025, 1, 5)), DayType::Weekday);
    }

    #[test]
    fn test_priority() {
        let calendar = calendar_2025();
        // Friday inside Ramadan
        assert_eq!(calendar.classify(date(2025, 3, 7)), DayType::Ramadan);
        assert_eq!(calendar.classify(date(2025, 3, 31)), DayType::EidFitr);
        assert_eq!(calendar.classify(date(2025, 6, 6)), DayType::EidAdha);
        assert_eq!(calendar.classify(date(2025, 2, 22)), DayType::NationalHoliday);
        assert_eq!(calendar.classify(date(2025, 6, 26)), DayType::Holiday);

        // Eid outranks a national holiday falling inside it
        let overlapping = HolidayCalendar {
            eid_fitr: vec![DateRange::new(date(2030, 2, 20), date(2030, 2, 23))],
            ..HolidayCalendar::default()
        };
        assert_eq!(overlapping.classify(date(2030, 2, 22)), DayType::EidFitr);
    }

    #[test]
    fn test_factors() {
        let calendar = DayCalendar::new(CalendarFactors::default(), calendar_2025());
        assert_eq!(calendar.factor(date(2025, 1, 5)), 1.0);
        assert_eq!(calendar.factor(date(2025, 1, 3)), 0.5);
        assert_eq!(calendar.factor(date(2025, 1, 4)), 0.6);
        assert_eq!(calendar.factor(date(2025, 3, 10)), 0.7);
        assert_eq!(calendar.factor(date(2025, 6, 6)), 0.3);
        assert_eq!(calendar.factor(date(2025, 9, 23)), 0.5);
    }

    #[test]
    fn test_weekday_position() {
        assert_eq!(weekday_position(date(2025, 5, 1)), 1);
        assert_eq!(weekday_position(date(2025, 5, 7)), 1);
        assert_eq!(weekday_position(date(2025, 5, 8)), 2);
        assert_eq!(weekday_position(date(2025, 5, 31)), 5);
    }

    #[test]
    fn test_month_days() {
        assert_eq!(month_days(2024, 2).len(), 29);
        assert_eq!(month_days(2025, 2).len(), 28);
        assert_eq!(month_days(2025, 12).last(), Some(&date(2025, 12, 31)));
        assert!(month_days(2025, 13).is_empty());
    }

    #[test]
    fn test_factors_deserialize_with_defaults() {
        let factors: CalendarFactors = serde_json::from_str(r#"{"friday": 0.4}"#).unwrap();
        assert_eq!(factors.friday, 0.4);
        assert_eq!(factors.weekday, 1.0);
    }
}
