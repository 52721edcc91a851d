//! Paginated pull client for the NYC OpenData registration feed.
//!
//! The feed serves `.nyc` registrations as JSON pages of a fixed size.
//! Collection walks `$offset` windows in `$order=:id` order and stops at
//! the first empty page.

use crate::error::{FeedError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use nycdomains_core::{DomainName, DomainRecord};
use serde::Deserialize;
use std::time::Duration;

/// Client for the registration feed endpoint.
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
    batch_size: u32,
}

/// One raw feed row as served by the endpoint.
#[derive(Debug, Deserialize)]
struct FeedRow {
    domain_name: String,
    domain_registration_date: String,
    #[serde(default)]
    nexus_category: Option<String>,
}

impl FeedClient {
    /// Create a new feed client.
    ///
    /// # Errors
    /// Returns error if the endpoint is not a valid URL or the HTTP client
    /// cannot be created.
    pub fn new(base_url: impl Into<String>, batch_size: u32) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            batch_size,
        })
    }

    /// Collect every record currently available from the feed.
    pub async fn all_records(&self) -> Result<Vec<DomainRecord>> {
        self.collect(None).await
    }

    /// Collect records registered at or after `since`.
    pub async fn records_since(&self, since: DateTime<Utc>) -> Result<Vec<DomainRecord>> {
        self.collect(Some(since)).await
    }

    async fn collect(&self, since: Option<DateTime<Utc>>) -> Result<Vec<DomainRecord>> {
        let mut records = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let page = self.fetch_page(offset, since).await?;
            if page.is_empty() {
                tracing::info!("No more feed data at offset {}", offset);
                break;
            }

            tracing::info!("Collected {} feed rows at offset {}", page.len(), offset);
            records.extend(page);
            offset += self.batch_size;
        }

        tracing::info!("Collected {} records from {}", records.len(), self.base_url);
        Ok(records)
    }

    async fn fetch_page(
        &self,
        offset: u32,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DomainRecord>> {
        let mut query = vec![
            ("$order".to_string(), ":id".to_string()),
            ("$offset".to_string(), offset.to_string()),
            ("$limit".to_string(), self.batch_size.to_string()),
        ];

        if let Some(since) = since {
            let start = since.format("%Y-%m-%dT%H:%M:%S");
            let end = Utc::now().format("%Y-%m-%dT%H:%M:%S");
            query.push((
                "$where".to_string(),
                format!("domain_registration_date between '{start}' and '{end}'"),
            ));
        }

        tracing::debug!("Retrieving feed page at offset {}", offset);

        let rows: Vec<FeedRow> = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut page = Vec::with_capacity(rows.len());
        for row in rows {
            match decode_row(row) {
                Ok(record) => page.push(record),
                Err(e) => tracing::warn!("Skipping malformed feed row: {}", e),
            }
        }

        Ok(page)
    }
}

fn decode_row(row: FeedRow) -> Result<DomainRecord> {
    let domain = DomainName::new(&row.domain_name)
        .map_err(|e| FeedError::Decode(format!("bad domain '{}': {e}", row.domain_name)))?;

    Ok(DomainRecord {
        domain,
        registration_date: parse_feed_timestamp(&row.domain_registration_date)?,
        category: row.nexus_category.unwrap_or_default(),
    })
}

/// Parse a feed timestamp.
///
/// The endpoint serves floating timestamps without a zone
/// (`2025-02-08T00:00:00.000`); zoned RFC 3339 and bare dates are also
/// accepted. Floating values are taken as UTC.
fn parse_feed_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(FeedError::Decode(format!("bad timestamp '{raw}'")))
}
