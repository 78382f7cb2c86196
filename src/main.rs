//! Command-line tool extracting delivery records from a CSV file by district
//! and/or datetime range.

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use data::{parse_datetime, Error};
use filter::FilterCriteria;
use read::load_dataset;
use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use write::write_dataset;

mod data;
mod filter;
mod read;
mod write;

#[derive(Parser)]
#[command(name = "delivery_filter")]
#[command(about = "Delivery filter CLI tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve the delivery rows matching a district and/or datetime range
    Get(GetArgs),
}

#[derive(Args, Debug)]
struct GetArgs {
    /// CSV file with Id, District, Datetime and Weight columns
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Keep only rows of this district (exact, case-sensitive)
    #[arg(long)]
    district: Option<String>,

    /// Keep only rows at or after this time ("YYYY-MM-DD HH:MM[:SS]")
    #[arg(long, value_parser = datetime_arg)]
    from_datetime: Option<NaiveDateTime>,

    /// Keep only rows at or before this time ("YYYY-MM-DD HH:MM[:SS]")
    #[arg(long, value_parser = datetime_arg)]
    to_datetime: Option<NaiveDateTime>,

    /// Output CSV file; matching rows go to stdout when omitted
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// Also append log records to this file
    #[arg(long)]
    logfile: Option<PathBuf>,
}

impl GetArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            district: self.district.clone(),
            from: self.from_datetime,
            to: self.to_datetime,
        }
    }
}

fn datetime_arg(value: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(value)
        .ok_or_else(|| format!("expected \"YYYY-MM-DD HH:MM[:SS]\", got \"{value}\""))
}

/// Stderr logging filtered by `RUST_LOG` (warnings by default), plus an
/// optional plain-text log file which records everything from debug up.
/// The returned guard flushes the file when dropped.
fn init_logging(logfile: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match logfile {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file '{}'", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}

/// Load, validate, filter, write. Filtering is done in full before the
/// output is opened, so a failed run leaves no output file behind.
fn get(args: &GetArgs) -> Result<usize, Error> {
    let dataset = load_dataset(&args.file)?;
    info!(file = %args.file.display(), rows = dataset.rows.len(), "Input loaded");

    let criteria = args.criteria();
    info!(?criteria, "Filtering");
    let filtered = dataset.filter(&criteria)?;

    match &args.outfile {
        Some(path) => write_dataset(File::create(path)?, &filtered)?,
        None => write_dataset(std::io::stdout().lock(), &filtered)?,
    }
    Ok(filtered.rows.len())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Get(args) = cli.command;

    let _guard = match init_logging(args.logfile.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            println!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    info!("Program starts");

    match get(&args) {
        Ok(written) => {
            info!(written, "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Get failed");
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
