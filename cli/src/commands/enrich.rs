//! The `enrich` command: store (or input file) -> workers -> run output
//! -> store upsert.

use crate::EnrichArgs;
use anyhow::Context;
use nycdomains_core::AppConfig;
use nycdomains_db::{enriched_domains, Database};
use nycdomains_enricher::{
    read_input_records, BatchCoordinator, Enricher, FetchClient, RunOutput,
};
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run one enrichment batch.
///
/// Pipeline mode (no `--input`) pulls the stalest store records, enriches
/// them, merges the finished run back into the store, and removes the run
/// file. Standalone mode enriches an explicit input file and leaves the
/// run output in place.
pub async fn run(args: &EnrichArgs) -> anyhow::Result<()> {
    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    let overall = Instant::now();

    // 1. Collect input
    let stage = Instant::now();
    let (records, db) = collect_input(args, &config).await?;
    tracing::info!(
        "Collected {} input records in {:.2?}",
        records.len(),
        stage.elapsed()
    );

    // 2. Enrich
    let stage = Instant::now();
    let timeout = if args.asynchronous {
        config.enrichment.concurrent_timeout_secs
    } else {
        config.enrichment.timeout_secs
    };
    let fetcher = FetchClient::new(Duration::from_secs(timeout), &config.enrichment.user_agent)?;
    let coordinator = BatchCoordinator::new(Arc::new(Enricher::new(fetcher)))
        .with_max_concurrent(config.enrichment.max_concurrent_fetches);

    let report = if args.asynchronous {
        coordinator.run_concurrent(&records, &args.output_path).await?
    } else {
        coordinator.run_sequential(&records, &args.output_path).await?
    };
    tracing::info!(
        "Enriched {} domains ({} skipped) in {:.2?}",
        report.enriched,
        report.skipped,
        stage.elapsed()
    );

    // 3. Merge into the store and clean up (pipeline mode only)
    if let Some(db) = db {
        let stage = Instant::now();
        let enriched = RunOutput::load_records(&args.output_path)?;
        enriched_domains::upsert_records(db.pool(), &enriched)
            .await
            .context("store upsert failed")?;
        tracing::info!(
            "Upserted {} records into the store in {:.2?}",
            enriched.len(),
            stage.elapsed()
        );

        match std::fs::remove_file(&args.output_path) {
            Ok(()) => tracing::info!("Removed run output {}", args.output_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Run output {} not found", args.output_path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!("Completed everything in {:.2?}", overall.elapsed());
    Ok(())
}

async fn collect_input(
    args: &EnrichArgs,
    config: &AppConfig,
) -> anyhow::Result<(Vec<nycdomains_core::DomainRecord>, Option<Database>)> {
    if let Some(input_path) = &args.input {
        let records = read_input_records(input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?;
        return Ok((records, None));
    }

    let db = super::open_store(config).await?;
    let limit = args.limit.unwrap_or(config.store.refresh_batch);
    let records = enriched_domains::fetch_stalest(db.pool(), limit)
        .await
        .context("store fetch failed")?;
    Ok((records, Some(db)))
}
