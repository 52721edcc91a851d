//! nycdomains command-line entry point.
//!
//! Thin wrappers only: argument parsing, env/credential loading, and log
//! setup live here; all decision logic belongs to the library crates.
//! Errors are logged and exit non-zero without panicking.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nycdomains",
    version,
    about = "Enrich newly registered .nyc domains with liveness and page metadata"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pull new registrations from the open-data feed into the store
    Ingest {
        /// Only pull registrations at or after this timestamp
        #[arg(long)]
        since: Option<String>,
    },
    /// Enrich domains and merge the results into the store
    Enrich(EnrichArgs),
    /// Probe a single domain and print its enrichment result
    Probe {
        /// The domain to probe (e.g. example.nyc)
        domain: String,
    },
}

#[derive(clap::Args)]
struct EnrichArgs {
    /// Path for the run output file
    output_path: PathBuf,

    /// Run with bounded concurrency instead of sequentially
    #[arg(short = 'a', long)]
    asynchronous: bool,

    /// Standalone mode: read input records from this file instead of the store
    #[arg(long)]
    input: Option<PathBuf>,

    /// Number of stalest store records to enrich
    #[arg(long)]
    limit: Option<u32>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ingest { since } => commands::ingest::run(since).await,
        Command::Enrich(args) => commands::enrich::run(&args).await,
        Command::Probe { domain } => commands::probe::run(&domain).await,
    };

    if let Err(e) = result {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}
