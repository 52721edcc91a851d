//! The input and output record shapes of the enrichment pipeline.
//!
//! A [`DomainRecord`] is read-only input sourced from the registration
//! feed. An [`EnrichedRecord`] is produced by exactly one enrichment
//! worker invocation, appended to the run output, and upserted into the
//! store keyed by domain. Later runs overwrite earlier rows; there is no
//! historical versioning.

use crate::types::{DomainName, Field, WebsiteStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of registration-feed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// The registered domain name.
    pub domain: DomainName,
    /// When the domain was registered.
    pub registration_date: DateTime<Utc>,
    /// The registrant category reported by the feed.
    pub category: String,
}

/// The persisted output of enriching one domain.
///
/// Keyed by `domain`; the store upserts on that key. The convenience
/// booleans and `website_status` are derived from the sentinel fields by
/// the classifier and must stay consistent with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// The registered domain name (primary key).
    pub domain: DomainName,
    /// Registration date carried over from the input record.
    pub registration_date: DateTime<Utc>,
    /// Registrant category carried over from the input record.
    pub category: String,
    /// HTTP status of the terminal fetch attempt.
    pub status_code: Field<u16>,
    /// Address the fetch finally landed on after redirects.
    pub final_address: Field<String>,
    /// Page title.
    pub title: Field<String>,
    /// Page description.
    pub description: Field<String>,
    /// Page image URL, absolutized against the final address.
    pub image_url: Field<String>,
    /// Whether `final_address` holds a real value.
    pub is_address_found: bool,
    /// Whether `title` holds a real value.
    pub is_title_found: bool,
    /// Whether `image_url` holds a real value.
    pub is_image_found: bool,
    /// Overall reachability classification.
    pub website_status: WebsiteStatus,
    /// When this record was finalized; monotonic per domain across runs.
    pub last_updated_at: DateTime<Utc>,
}
