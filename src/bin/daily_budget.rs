//! Spread quarterly/monthly budget rows to calendar days
//!
//! Reads budget_rows.csv and (optionally) actuals.csv, writes the daily records
//! and prints a reconciliation of source against distributed totals.

use anyhow::{bail, Context, Result};
use budget_engine::distribution::{
    load_actuals, load_budget_rows, summarize, DailyRecord, Distributor, PeriodGrain, WeightTable,
};
use budget_engine::DistributionConfig;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "daily_budget", version, about = "Daily distribution of budget rows")]
struct Cli {
    /// Budget rows (BranchId,Year,Quarter,Month,CareType,StayType,Speciality,Census,Episodes,CPE,ALOS,Revenue)
    #[arg(long, default_value = "data/budget_rows.csv")]
    budget_rows: PathBuf,

    /// Historical actuals for day-position weights; calendar factors only if omitted
    #[arg(long)]
    actuals: Option<PathBuf>,

    /// JSON distribution configuration (factors, holiday calendar, decimals)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    year: i32,

    /// Restrict to one quarter (1-4)
    #[arg(long)]
    quarter: Option<u8>,

    #[arg(long)]
    branch: Option<u8>,

    /// Write the detail records instead of the per-day roll-up
    #[arg(long)]
    detail: bool,

    /// Reconciliation grain printed after distributing
    #[arg(long, default_value = "month")]
    summary: String,

    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Output file (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn write_records<W: Write>(writer: W, records: &[DailyRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "BranchId", "Date", "Quarter", "CareType", "StayType", "Speciality", "Census", "Episodes", "CPE", "ALOS",
        "Revenue",
    ])?;
    for r in records {
        csv_writer.write_record([
            r.branch_id.to_string(),
            r.date.to_string(),
            r.quarter.to_string(),
            r.care_type.clone(),
            r.stay_type.to_string(),
            r.speciality.clone().unwrap_or_default(),
            r.census.to_string(),
            r.episodes.to_string(),
            r.cpe.to_string(),
            r.alos.to_string(),
            r.revenue.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let start = Instant::now();

    if cli.quarter.is_some_and(|q| !(1..=4).contains(&q)) {
        bail!("--quarter must be between 1 and 4");
    }
    let grain: PeriodGrain = cli.summary.parse()?;

    let config = match &cli.config {
        Some(path) => DistributionConfig::from_json_path(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => DistributionConfig::default(),
    };

    let rows = load_budget_rows(&cli.budget_rows, cli.year, cli.quarter, cli.branch)
        .with_context(|| format!("Failed to load {}", cli.budget_rows.display()))?;
    if rows.is_empty() {
        bail!("No budget rows for {} in {}", cli.year, cli.budget_rows.display());
    }

    let weights = match &cli.actuals {
        Some(path) => WeightTable::from_actuals(
            &load_actuals(path).with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => {
            warn!("No actuals given; days weighted by calendar factor only");
            WeightTable::default()
        }
    };

    let distributor = Distributor::new(config.day_calendar(), weights, config.decimals);
    let result = distributor.distribute(&rows);
    info!(
        "Distributed {} rows into {} daily records in {:?}",
        rows.len(),
        result.daily.len(),
        start.elapsed()
    );

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Unable to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    match cli.format {
        OutputFormat::Csv => {
            let records = if cli.detail { &result.detail } else { &result.daily };
            write_records(writer, records)?;
        }
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &result)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }

    eprintln!("\nReconciliation ({:?}):", grain);
    eprintln!(
        "{:>6} {:>8} {:>18} {:>12} {:>12} {:>12} {:>8}",
        "Period", "Stay", "Revenue", "Census", "Episodes", "CostPerUnit", "ALOS"
    );
    for row in summarize(&result.daily, grain, config.decimals) {
        eprintln!(
            "{:>6} {:>8} {:>18} {:>12} {:>12} {:>12} {:>8}",
            row.bucket,
            row.stay_type.as_str(),
            row.revenue,
            row.census,
            row.episodes,
            row.cost_per_unit,
            row.alos
        );
    }
    eprintln!(
        "Source revenue {} / distributed {}; source census {} / distributed {}",
        result.source_totals.revenue,
        result.distributed_totals.revenue,
        result.source_totals.census,
        result.distributed_totals.census
    );

    if result.source_totals != result.distributed_totals {
        bail!("Distributed totals do not reconcile with the budget rows");
    }
    Ok(())
}
