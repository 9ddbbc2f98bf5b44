//! PreBurn CLI - Command-line interface for the PreBurn risk engine
//!
//! Commands:
//! - score: Score the most recent day and print a risk report
//! - forecast: Project risk scores over a horizon
//! - history: Print the per-day risk score table

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use preburn::pipeline::RiskEngine;
use preburn::report::ReportEncoder;
use preburn::types::DailyMetricsRow;
use preburn::ENGINE_VERSION;

/// PreBurn - Burnout risk engine for daily wearable and behavioral metrics
#[derive(Parser)]
#[command(name = "preburn")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Estimate and forecast daily burnout risk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the most recent day and print a risk report
    Score {
        /// Input file with a JSON array of daily rows (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Project risk scores over a horizon
    Forecast {
        /// Input file with a JSON array of daily rows (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Forecast horizon in days
        #[arg(long, default_value = "3")]
        horizon: usize,
    },

    /// Print the per-day risk score table
    History {
        /// Input file with a JSON array of daily rows (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), preburn::EngineError> {
    match cli.command {
        Commands::Score { input } => {
            let engine = load_engine(&input)?;
            let encoder = ReportEncoder::new();
            let report = encoder.encode(&engine)?;
            print_json(&report)
        }
        Commands::Forecast { input, horizon } => {
            let engine = load_engine(&input)?;
            let forecast = engine.forecast_risk(horizon);
            print_json(&serde_json::json!({ "forecast": forecast }))
        }
        Commands::History { input } => {
            let engine = load_engine(&input)?;
            let history = engine.history();
            print_json(&serde_json::json!({ "history": history }))
        }
    }
}

fn load_engine(input: &Path) -> Result<RiskEngine, preburn::EngineError> {
    let raw = read_input(input)
        .map_err(|e| preburn::EngineError::ParseError(format!("{}: {e}", input.display())))?;
    let rows: Vec<DailyMetricsRow> = serde_json::from_str(&raw)?;
    let mut engine = RiskEngine::new();
    engine.load_table(rows);
    Ok(engine)
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), preburn::EngineError> {
    // Pretty output on a terminal, compact when piped
    let json = if atty::is(atty::Stream::Stdout) {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
