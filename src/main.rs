//! Budget Engine CLI
//!
//! Income statement for a branch subset, written as CSV or JSON

use anyhow::{Context, Result};
use budget_engine::catalog::{self, LineCode};
use budget_engine::config::HorizonKind;
use budget_engine::projection::{round_to, DisplayStatement};
use budget_engine::{BranchSelection, BudgetRunner, CsvSource, LineItemValues, PeriodTotals, RunConfig, Scenario};
use clap::{Parser, ValueEnum};
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Branch budget income statement
#[derive(Parser, Debug)]
#[command(name = "budget_engine", version, about = "Branch budget income statement")]
struct Cli {
    /// Directory holding revenue.csv, assumptions.csv and allocations.csv
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON run configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Branches: "all", one id, or a comma separated list
    #[arg(long, default_value = "all")]
    branches: String,

    #[arg(long)]
    year: Option<i32>,

    /// most_likely, best_case or worst_case
    #[arg(long)]
    scenario: Option<String>,

    #[arg(long, value_enum)]
    horizon: Option<HorizonArg>,

    /// Decimal places for displayed amounts
    #[arg(long)]
    decimals: Option<u32>,

    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Output file (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HorizonArg {
    Monthly,
    Daily,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Serialize)]
struct BranchSummary<'a> {
    branch_id: u8,
    name: Option<&'a str>,
    fiscal_total: LineItemValues,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    year: i32,
    scenario: Scenario,
    selection: &'a str,
    statement: &'a DisplayStatement,
    quarters: Vec<LineItemValues>,
    branches: Vec<BranchSummary<'a>>,
}

fn load_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_json_path(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(year) = cli.year {
        config.year = year;
    }
    if let Some(scenario) = &cli.scenario {
        config.scenario = scenario.parse()?;
    }
    if let Some(horizon) = cli.horizon {
        config.horizon = match horizon {
            HorizonArg::Monthly => HorizonKind::Monthly,
            HorizonArg::Daily => HorizonKind::Daily,
        };
    }
    if let Some(decimals) = cli.decimals {
        config.display_decimals = decimals;
    }
    Ok(config)
}

/// Quarter columns summed from the displayed periods so they foot with them
fn display_quarters<T: PeriodTotals>(totals: &T, display: &DisplayStatement, decimals: u32) -> Vec<LineItemValues> {
    (1..=4u8)
        .map(|q| {
            let range = totals.horizon().quarter(q);
            let start = range.start().index();
            let end = usize::from(range.end().0).min(display.periods.len());
            display.periods[start.min(end)..end]
                .iter()
                .sum::<LineItemValues>()
                .rounded(decimals)
        })
        .collect()
}

fn write_csv<W: Write>(writer: W, display: &DisplayStatement, quarters: &[LineItemValues], decimals: u32) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["LineItemCode".to_string(), "LineItem".to_string()];
    header.extend((1..=display.periods.len()).map(|p| format!("P{}", p)));
    header.extend((1..=4).map(|q| format!("Q{}", q)));
    header.push("Total".to_string());
    csv_writer.write_record(&header)?;

    let cell = |amount: f64| format!("{:.*}", decimals as usize, round_to(amount, decimals));
    for &code in LineCode::ALL {
        let mut record = vec![code.as_str().to_string(), catalog::definition(code).name.to_string()];
        record.extend(display.periods.iter().map(|values| cell(values[code])));
        record.extend(quarters.iter().map(|values| cell(values[code])));
        record.push(cell(display.total[code]));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let selection: BranchSelection = cli.branches.parse()?;
    let decimals = config.display_decimals;

    let source = CsvSource::from_dir(&cli.data_dir);
    let runner = BudgetRunner::new(config);
    let run = runner.run(&source, &selection);

    let display = run.aggregate.display(decimals);
    let quarters = display_quarters(&run.aggregate, &display, decimals);
    let fiscal = run.aggregate.fiscal_total();
    info!(
        "{} {}: REV_NET {:.2}, EBITDA {:.2}, NET_PROFIT {:.2}",
        runner.config().scenario,
        runner.config().year,
        fiscal[LineCode::RevNet],
        fiscal[LineCode::Ebitda],
        fiscal[LineCode::NetProfit]
    );

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Unable to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match cli.format {
        OutputFormat::Csv => write_csv(writer, &display, &quarters, decimals)?,
        OutputFormat::Json => {
            let report = JsonReport {
                year: runner.config().year,
                scenario: runner.config().scenario,
                selection: &run.selection,
                statement: &display,
                quarters,
                branches: run
                    .projections
                    .iter()
                    .map(|p| BranchSummary {
                        branch_id: p.branch_id,
                        name: runner.config().branch_name(p.branch_id),
                        fiscal_total: p.fiscal_total().rounded(decimals),
                    })
                    .collect(),
            };
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }

    if let Some(path) = &cli.output {
        info!("Statement written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_engine::revenue::PeriodRevenue;
    use budget_engine::{compute, AllocationSet, AssumptionSet};

    #[test]
    fn test_write_csv_layout() {
        let period = compute(
            &PeriodRevenue::new(1000.0, 250.5, 0.0),
            &AssumptionSet::default(),
            &AllocationSet::default(),
        );
        let display = DisplayStatement {
            periods: vec![period, period],
            total: period + period,
        };
        let quarters = vec![period + period, LineItemValues::zero(), LineItemValues::zero(), LineItemValues::zero()];

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &display, &quarters, 2).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "LineItemCode,LineItem,P1,P2,Q1,Q2,Q3,Q4,Total");
        assert_eq!(lines.len(), 1 + LineCode::ALL.len());
        assert_eq!(lines[1], "REV_IP,Inpatient Revenue,1000.00,1000.00,2000.00,0.00,0.00,0.00,2000.00");
        assert!(lines[4].starts_with("REV_SUB,"));
        assert!(lines[4].ends_with(",2501.00"));
    }
}
