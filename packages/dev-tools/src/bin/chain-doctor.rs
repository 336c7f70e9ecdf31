//! Chain Doctor
//!
//! Reconstructs every chain in a backend snapshot and reports what was wrong
//! with the stored links.
//!
//! # Usage
//!
//! ```bash
//! # Inspect a dump
//! cargo run --bin chain-doctor -- modules.json
//!
//! # From stdin, with the link updates that would fix each chain
//! cargo run --bin chain-doctor -- --repair < exercises.json
//! ```
//!
//! Exits with 1 when at least one chain needed repair, 2 on input errors.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use classroom_dev_tools::doctor::{self, ChainReport};
use tracing_subscriber::EnvFilter;

/// Inspect previousId/nextId chains in a JSON snapshot
#[derive(Parser, Debug)]
#[command(name = "chain-doctor")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON array of records; reads stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the link updates that would repair each malformed chain
    #[arg(long)]
    repair: bool,

    /// Only inspect this parent
    #[arg(long, value_name = "PARENT_ID")]
    parent: Option<String>,

    /// Emit the reports as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Quiet by default; RUST_LOG=classroom_core=debug shows planning detail
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args).await {
        Ok(reports) if reports.iter().all(ChainReport::is_healthy) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<Vec<ChainReport>> {
    let store = doctor::load_snapshot(args.file.as_deref()).await?;
    let reports = doctor::diagnose(&store, args.parent.as_deref(), args.repair).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(reports);
    }

    for report in &reports {
        print!("{}", doctor::render(report));
        if let Some(plan) = report.repair.as_ref().filter(|p| !p.is_empty()) {
            println!("   repair:");
            println!("{}", serde_json::to_string_pretty(&plan.updates)?);
        }
    }

    let unhealthy = reports.iter().filter(|r| !r.is_healthy()).count();
    println!(
        "\n{} chains inspected, {} needed repair",
        reports.len(),
        unhealthy
    );
    Ok(reports)
}
