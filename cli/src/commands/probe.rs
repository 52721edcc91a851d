//! The `probe` command: enrich one domain and print the result.

use anyhow::Context;
use chrono::Utc;
use nycdomains_core::{AppConfig, DomainName, DomainRecord};
use nycdomains_enricher::{Enrich, Enricher, FetchClient};
use std::time::Duration;

/// Probe a single domain with the production worker and print every
/// field of the resulting record.
pub async fn run(domain: &str) -> anyhow::Result<()> {
    let config = AppConfig::load_with_env().context("failed to load configuration")?;

    let fetcher = FetchClient::new(
        Duration::from_secs(config.enrichment.timeout_secs),
        &config.enrichment.user_agent,
    )?;
    let worker = Enricher::new(fetcher);

    let input = DomainRecord {
        domain: DomainName::new(domain)?,
        registration_date: Utc::now(),
        category: String::new(),
    };

    let record = worker.enrich(&input).await;

    println!("\nResults for {domain}");
    println!("{}", "-".repeat(50));
    println!("Status Code: {}", record.status_code);
    println!("Final Address: {}", record.final_address);
    println!("\nMetadata:");
    println!("Title: {}", record.title);
    println!("Description: {}", record.description);
    println!("Image URL: {}", record.image_url);
    println!("\nStatus:");
    println!("Address Found: {}", record.is_address_found);
    println!("Title Found: {}", record.is_title_found);
    println!("Image Found: {}", record.is_image_found);
    println!("Website Status: {}", record.website_status);

    Ok(())
}
