//! The `ingest` command: open-data feed -> store.

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use nycdomains_core::AppConfig;
use nycdomains_db::enriched_domains;
use nycdomains_feed::FeedClient;
use std::time::Instant;

/// Pull registrations from the feed and upsert them into the store.
pub async fn run(since: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    let feed = FeedClient::new(&config.feed.base_url, config.feed.batch_size)?;

    let overall = Instant::now();

    let stage = Instant::now();
    let records = match since {
        Some(raw) => feed.records_since(parse_since(&raw)?).await?,
        None => feed.all_records().await?,
    };
    tracing::info!(
        "Pulled {} records from the feed in {:.2?}",
        records.len(),
        stage.elapsed()
    );

    let stage = Instant::now();
    let db = super::open_store(&config).await?;
    enriched_domains::upsert_domains(db.pool(), &records)
        .await
        .context("store upsert failed")?;
    tracing::info!("Merged into the store in {:.2?}", stage.elapsed());

    tracing::info!("Ingest completed in {:.2?}", overall.elapsed());
    Ok(())
}

/// Parse a `--since` value; zoned, floating, and bare-date forms accepted.
fn parse_since(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    bail!("invalid --since timestamp '{raw}'")
}
