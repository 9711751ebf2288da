//! Cash Flow Projection CLI
//!
//! Reads a CSV export of records and writes one projection report as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- records.csv 2025-01-01 2025-12-31 2500 monthly > months.csv
//! ```
//!
//! The opening balance defaults to 0 and the report to `monthly`
//! (`balance` and `clusters` are also available).
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug`, `info` or `warn` to control logging verbosity

use cashflow_projection::{
    parse_date, write_report, CsvRecordStore, DateWindow, EngineError, MinimumGranularity,
    Money, ProjectionConfig, ProjectionSession, Report, Result,
};
use log::{info, warn};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;
use std::str::FromStr;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        return Err(EngineError::MissingArgument);
    }

    let input_path = &args[1];
    let window = DateWindow::new(parse_date(&args[2])?, parse_date(&args[3])?)?;
    let opening_balance = match args.get(4) {
        Some(raw) => Money::from_str(raw).map_err(|_| EngineError::InvalidAmount(raw.clone()))?,
        None => Money::ZERO,
    };
    let report = match args.get(5) {
        Some(raw) => Report::from_str(raw).map_err(EngineError::UnknownReport)?,
        None => Report::default(),
    };

    let file = File::open(input_path)?;
    let store = CsvRecordStore::from_reader(BufReader::new(file))?;

    let session = ProjectionSession::new();
    let config = ProjectionConfig::new(window, opening_balance);
    let Some(projection) = session.recompute(&store, &config)? else {
        return Ok(());
    };

    let event_min = projection.minimum_at(MinimumGranularity::Event);
    let month_min = projection.minimum_at(MinimumGranularity::Month);
    info!(
        "Final balance {}, minimum {} on {} (month-end minimum {} on {})",
        projection.final_balance(),
        event_min.amount,
        event_min.date,
        month_min.amount,
        month_min.date
    );
    if let Some(gap) = projection.minimum_discrepancy() {
        warn!(
            "Balance dips {} below the lowest month-end balance within a month",
            gap
        );
    }

    let stdout = io::stdout();
    let handle = stdout.lock();
    write_report(&projection, report, handle)?;

    Ok(())
}
