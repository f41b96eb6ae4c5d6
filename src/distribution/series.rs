//! Monthly revenue spread to calendar days for the daily horizon

use super::allocate::allocate_exact;
use super::calendar::{month_days, DayCalendar};
use crate::revenue::{CareType, RevenueSeries};
use crate::types::{Horizon, Period};
use chrono::Datelike;
use log::warn;
use rust_decimal::prelude::*;

/// Spread a monthly revenue series over the days of `year`.
///
/// Each month and care type is split by calendar factor with exact allocation at
/// `decimals` places, so a month's daily amounts add back to its total (rounded to
/// `decimals`). Periods of the result are day-of-year ordinals.
pub fn daily_revenue_series(monthly: &RevenueSeries, year: i32, calendar: &DayCalendar, decimals: u32) -> RevenueSeries {
    let horizon = Horizon::Daily { year };
    let mut daily = RevenueSeries::new();

    for (period, revenue) in monthly.iter() {
        if !Horizon::Monthly.contains(period) {
            warn!("Revenue period {} is not a month; not spread to days", period);
            continue;
        }
        let days = month_days(year, u32::from(period.0));
        let weights: Vec<f64> = days.iter().map(|d| calendar.factor(*d)).collect();

        for care_type in CareType::ALL {
            let amount = revenue.amount(care_type);
            if amount == 0.0 {
                continue;
            }
            let Some(total) = Decimal::from_f64(amount) else {
                warn!("Revenue {} for month {} cannot be represented exactly; skipped", amount, period);
                continue;
            };
            let parts = allocate_exact(total, &weights, decimals);
            for (date, part) in days.iter().zip(parts) {
                let day = Period(date.ordinal() as u16);
                debug_assert!(horizon.contains(day));
                daily.add(day, care_type, part.to_f64().unwrap_or_default());
            }
        }
    }

    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revenue::PeriodRevenue;
    use approx::assert_relative_eq;

    #[test]
    fn test_month_totals_preserved() {
        let mut monthly = RevenueSeries::new();
        monthly.set_period(Period(1), PeriodRevenue::new(100_000.0, 31_000.5, 0.0));
        monthly.set_period(Period(2), PeriodRevenue::new(28_000.0, 0.0, 1_234.5678));

        let daily = daily_revenue_series(&monthly, 2025, &DayCalendar::default(), 4);
        let horizon = Horizon::Daily { year: 2025 };

        let january = |care: CareType| -> f64 {
            horizon
                .periods()
                .filter(|p| horizon.month_of(*p) == 1)
                .map(|p| daily.period(p).amount(care))
                .sum()
        };
        assert_relative_eq!(january(CareType::Ip), 100_000.0, max_relative = 1e-12);
        assert_relative_eq!(january(CareType::Op), 31_000.5, max_relative = 1e-12);
        assert_eq!(january(CareType::Er), 0.0);

        let february: f64 = (32..=59).map(|d| daily.period(Period(d)).amount(CareType::Er)).sum();
        assert_relative_eq!(february, 1_234.5678, max_relative = 1e-12);
        assert!(daily.period(Period(60)).total() == 0.0);
    }

    #[test]
    fn test_weekend_days_get_less() {
        let mut monthly = RevenueSeries::new();
        monthly.set_period(Period(1), PeriodRevenue::new(31_000.0, 0.0, 0.0));
        let daily = daily_revenue_series(&monthly, 2025, &DayCalendar::default(), 4);
        // 3 Jan 2025 is a Friday, 5 Jan a Sunday
        assert!(daily.period(Period(3)).ip < daily.period(Period(5)).ip);
    }
}
