//! Load revenue figures from revenue.csv

use super::{CareType, RevenueFigure, RevenueSeries};
use crate::assumptions::percent::parse_number;
use crate::error::{BudgetError, Result};
use crate::types::{BranchId, Horizon, Period};
use csv::Reader;
use log::debug;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Raw CSV row matching revenue.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "BranchId")]
    branch_id: BranchId,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Period")]
    period: u16,
    #[serde(rename = "CareType")]
    care_type: String,
    #[serde(rename = "Amount")]
    amount: String,
}

impl CsvRow {
    fn to_figure(&self, horizon: &Horizon) -> Result<RevenueFigure> {
        let period = horizon.check(Period(self.period))?;
        let care_type: CareType = self.care_type.parse()?;
        let amount = parse_number("Amount", &self.amount)?;
        if amount < 0.0 {
            return Err(BudgetError::NegativeRevenue {
                branch_id: self.branch_id,
                period: self.period,
                amount,
            });
        }

        Ok(RevenueFigure {
            branch_id: self.branch_id,
            period,
            care_type,
            amount,
        })
    }
}

/// Load revenue for one year from any reader, grouped by branch
pub fn load_revenue_from_reader<R: Read>(
    reader: R,
    year: i32,
    horizon: &Horizon,
) -> Result<HashMap<BranchId, RevenueSeries>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut series: HashMap<BranchId, RevenueSeries> = HashMap::new();
    let mut rows = 0usize;

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        if row.year != year {
            continue;
        }
        let figure = row.to_figure(horizon)?;
        series
            .entry(figure.branch_id)
            .or_default()
            .add(figure.period, figure.care_type, figure.amount);
        rows += 1;
    }

    debug!("Loaded {} revenue figures for {} branches ({})", rows, series.len(), year);
    Ok(series)
}

/// Load revenue for one year from a CSV file
pub fn load_revenue<P: AsRef<Path>>(
    path: P,
    year: i32,
    horizon: &Horizon,
) -> Result<HashMap<BranchId, RevenueSeries>> {
    let file = std::fs::File::open(path)?;
    load_revenue_from_reader(file, year, horizon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revenue::PeriodRevenue;

    #[test]
    fn test_load_revenue() {
        let data = "\
BranchId,Year,Period,CareType,Amount
1,2026,1,IP,100000
1,2026,1,OP,50000
1,2026,1,ER,10000
2,2026,3,OP,
1,2025,1,IP,999
";
        let series = load_revenue_from_reader(data.as_bytes(), 2026, &Horizon::Monthly).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[&1].period(Period(1)), PeriodRevenue::new(100000.0, 50000.0, 10000.0));
        assert_eq!(series[&2].period(Period(3)).total(), 0.0);
    }

    #[test]
    fn test_period_outside_horizon() {
        let data = "BranchId,Year,Period,CareType,Amount\n1,2026,13,IP,5\n";
        let err = load_revenue_from_reader(data.as_bytes(), 2026, &Horizon::Monthly).unwrap_err();
        assert!(matches!(err, BudgetError::PeriodOutOfRange { period: 13, horizon: 12 }));
    }

    #[test]
    fn test_negative_revenue_rejected() {
        let data = "BranchId,Year,Period,CareType,Amount\n1,2026,2,ER,-5\n";
        let err = load_revenue_from_reader(data.as_bytes(), 2026, &Horizon::Monthly).unwrap_err();
        assert!(matches!(err, BudgetError::NegativeRevenue { .. }));
    }
}
