//! Operations on the `enriched_domains` table.
//!
//! This module provides the store surface the pipeline depends on:
//! ingestion upserts, stalest-first input selection, and the
//! upsert-by-domain merge of finished enrichment runs.

use chrono::{DateTime, Utc};
use nycdomains_core::{DomainName, DomainRecord, EnrichedRecord, Field, WebsiteStatus};
use sqlx::{Pool, Row, Sqlite};

/// Upsert finished enrichment records, conflict-resolved on `domain`.
///
/// Latest-wins: an existing row for the same domain is overwritten in
/// full, including `last_updated_at`. There is no historical versioning.
///
/// # Errors
/// Returns `sqlx::Error` if any insert fails; rows already written in the
/// same call are not rolled back, matching the idempotent upsert contract.
pub async fn upsert_records(
    pool: &Pool<Sqlite>,
    records: &[EnrichedRecord],
) -> Result<(), sqlx::Error> {
    for record in records {
        sqlx::query(
            "INSERT INTO enriched_domains (domain, registration_date, category,
                                           status_code, final_address, title, description,
                                           image_url, is_address_found, is_title_found,
                                           is_image_found, website_status, last_updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(domain) DO UPDATE SET
                 registration_date = excluded.registration_date,
                 category = excluded.category,
                 status_code = excluded.status_code,
                 final_address = excluded.final_address,
                 title = excluded.title,
                 description = excluded.description,
                 image_url = excluded.image_url,
                 is_address_found = excluded.is_address_found,
                 is_title_found = excluded.is_title_found,
                 is_image_found = excluded.is_image_found,
                 website_status = excluded.website_status,
                 last_updated_at = excluded.last_updated_at",
        )
        .bind(record.domain.as_str())
        .bind(record.registration_date.to_rfc3339())
        .bind(&record.category)
        .bind(record.status_code.to_string())
        .bind(record.final_address.to_string())
        .bind(record.title.to_string())
        .bind(record.description.to_string())
        .bind(record.image_url.to_string())
        .bind(record.is_address_found)
        .bind(record.is_title_found)
        .bind(record.is_image_found)
        .bind(record.website_status.to_string())
        .bind(record.last_updated_at.to_rfc3339())
        .execute(pool)
        .await?;
    }

    tracing::info!("Upserted {} enriched records", records.len());
    Ok(())
}

/// Upsert registration-feed rows.
///
/// New domains get a row with empty enrichment columns; known domains
/// have their registration metadata refreshed without touching the
/// enrichment columns.
///
/// # Errors
/// Returns `sqlx::Error` if any insert fails.
pub async fn upsert_domains(
    pool: &Pool<Sqlite>,
    records: &[DomainRecord],
) -> Result<(), sqlx::Error> {
    for record in records {
        sqlx::query(
            "INSERT INTO enriched_domains (domain, registration_date, category)
             VALUES (?, ?, ?)
             ON CONFLICT(domain) DO UPDATE SET
                 registration_date = excluded.registration_date,
                 category = excluded.category",
        )
        .bind(record.domain.as_str())
        .bind(record.registration_date.to_rfc3339())
        .bind(&record.category)
        .execute(pool)
        .await?;
    }

    tracing::info!("Upserted {} domain records", records.len());
    Ok(())
}

/// Fetch the `limit` stalest rows as enrichment input.
///
/// Never-enriched rows have a NULL `last_updated_at` and sort first under
/// SQLite's ascending NULL ordering, so fresh ingests are probed before
/// old enrichments are refreshed.
///
/// # Errors
/// Returns `sqlx::Error` if the query fails or a row cannot be decoded.
pub async fn fetch_stalest(
    pool: &Pool<Sqlite>,
    limit: u32,
) -> Result<Vec<DomainRecord>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT domain, registration_date, category
         FROM enriched_domains
         ORDER BY last_updated_at ASC
         LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let domain: String = row.try_get("domain")?;
        let registration_date: String = row.try_get("registration_date")?;
        records.push(DomainRecord {
            domain: decode_domain(&domain)?,
            registration_date: decode_datetime(&registration_date)?,
            category: row.try_get("category")?,
        });
    }

    Ok(records)
}

/// Fetch one enriched row by domain, if present.
///
/// Rows that were ingested but never enriched come back with `NotFound`
/// in every enrichment field.
///
/// # Errors
/// Returns `sqlx::Error` if the query fails or the row cannot be decoded.
pub async fn get_by_domain(
    pool: &Pool<Sqlite>,
    domain: &str,
) -> Result<Option<EnrichedRecord>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT domain, registration_date, category, status_code, final_address,
                title, description, image_url, is_address_found, is_title_found,
                is_image_found, website_status, last_updated_at
         FROM enriched_domains
         WHERE domain = ?",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let domain: String = row.try_get("domain")?;
    let registration_date_raw: String = row.try_get("registration_date")?;
    let registration_date = decode_datetime(&registration_date_raw)?;

    let last_updated_at = match row.try_get::<Option<String>, _>("last_updated_at")? {
        Some(raw) => decode_datetime(&raw)?,
        // Ingested but never enriched; fall back to the registration date
        None => registration_date,
    };

    Ok(Some(EnrichedRecord {
        domain: decode_domain(&domain)?,
        registration_date,
        category: row.try_get("category")?,
        status_code: decode_field_u16(row.try_get("status_code")?),
        final_address: decode_field(row.try_get("final_address")?),
        title: decode_field(row.try_get("title")?),
        description: decode_field(row.try_get("description")?),
        image_url: decode_field(row.try_get("image_url")?),
        is_address_found: decode_bool(row.try_get("is_address_found")?),
        is_title_found: decode_bool(row.try_get("is_title_found")?),
        is_image_found: decode_bool(row.try_get("is_image_found")?),
        website_status: row
            .try_get::<Option<String>, _>("website_status")?
            .map_or(WebsiteStatus::IsDown, |raw| WebsiteStatus::parse(&raw)),
        last_updated_at,
    }))
}

fn decode_domain(raw: &str) -> Result<DomainName, sqlx::Error> {
    DomainName::new(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn decode_datetime(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(format!("invalid timestamp '{raw}': {e}").into()))
}

fn decode_field(raw: Option<String>) -> Field<String> {
    raw.map_or(Field::NotFound, |value| Field::<String>::parse(&value))
}

fn decode_field_u16(raw: Option<String>) -> Field<u16> {
    raw.map_or(Field::NotFound, |value| Field::<u16>::parse(&value))
}

fn decode_bool(raw: Option<i64>) -> bool {
    raw.is_some_and(|value| value != 0)
}
