//! Per-domain enrichment.
//!
//! One worker invocation turns one input record into exactly one output
//! record: resolve and fetch the domain, extract metadata from the body,
//! classify, stamp. Failures never cross this boundary; a fetch that dies
//! leaves the record in its all-`Error` terminal state and the batch
//! moves on.

use crate::classifier::classify;
use crate::extractor::{extract, PageMetadata};
use crate::resolver::FetchClient;
use async_trait::async_trait;
use chrono::Utc;
use nycdomains_core::{DomainRecord, EnrichedRecord, Field};

/// The per-domain enrichment contract.
///
/// The coordinator schedules anything implementing this, which keeps the
/// scheduling strategies testable without touching the network.
#[async_trait]
pub trait Enrich: Send + Sync {
    /// Produce the enriched record for one input domain.
    async fn enrich(&self, record: &DomainRecord) -> EnrichedRecord;
}

/// The production enrichment worker.
pub struct Enricher {
    fetcher: FetchClient,
}

impl Enricher {
    /// Create a worker over a shared fetch client.
    #[must_use]
    pub fn new(fetcher: FetchClient) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Enrich for Enricher {
    async fn enrich(&self, record: &DomainRecord) -> EnrichedRecord {
        let mut status_code = Field::Error;
        let mut final_address = Field::Error;
        let mut metadata = PageMetadata::error();

        if let Some(page) = self.fetcher.fetch_with_fallback(record.domain.as_str()).await {
            status_code = Field::Found(page.status_code);
            final_address = Field::Found(page.final_address.clone());
            metadata = extract(&page.body, &page.final_address);
        }

        let flags = classify(&final_address, &metadata.title);
        let is_image_found = metadata.image_url.is_found();

        tracing::debug!("Finished processing {}", record.domain);

        EnrichedRecord {
            domain: record.domain.clone(),
            registration_date: record.registration_date,
            category: record.category.clone(),
            status_code,
            final_address,
            title: metadata.title,
            description: metadata.description,
            image_url: metadata.image_url,
            is_address_found: flags.is_address_found,
            is_title_found: flags.is_title_found,
            is_image_found,
            website_status: flags.website_status,
            last_updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nycdomains_core::{DomainName, WebsiteStatus};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn input(domain: &str) -> DomainRecord {
        DomainRecord {
            domain: DomainName::new(domain).expect("valid domain"),
            registration_date: "2025-02-08T00:00:00Z".parse().expect("valid timestamp"),
            category: "ORG".to_string(),
        }
    }

    fn worker(timeout: Duration) -> Enricher {
        Enricher::new(FetchClient::new(timeout, "nycdomains-test").expect("build client"))
    }

    #[tokio::test]
    async fn test_enrich_complete_site() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta property="og:title" content="Hello"></head></html>"#,
            ))
            .mount(&server)
            .await;

        let record = worker(Duration::from_secs(5))
            .enrich(&input(&server.uri()))
            .await;

        assert_eq!(record.status_code, Field::Found(200));
        assert!(record.is_address_found);
        assert_eq!(record.title, Field::Found("Hello".to_string()));
        assert!(record.is_title_found);
        assert!(!record.is_image_found);
        assert_eq!(record.website_status, WebsiteStatus::IsComplete);
    }

    #[tokio::test]
    async fn test_enrich_live_site_without_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body><p>hi</p></body></html>"),
            )
            .mount(&server)
            .await;

        let record = worker(Duration::from_secs(5))
            .enrich(&input(&server.uri()))
            .await;

        assert!(record.is_address_found);
        assert_eq!(record.title, Field::NotFound);
        assert!(!record.is_title_found);
        assert_eq!(record.website_status, WebsiteStatus::IsLive);
    }

    #[tokio::test]
    async fn test_enrich_dead_domain() {
        // Nothing listens here; the fetch is irrecoverable
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let record = worker(Duration::from_secs(2))
            .enrich(&input(&format!("http://127.0.0.1:{port}")))
            .await;

        assert_eq!(record.status_code, Field::Error);
        assert_eq!(record.final_address, Field::Error);
        assert_eq!(record.title, Field::Error);
        assert_eq!(record.description, Field::Error);
        assert_eq!(record.image_url, Field::Error);
        assert!(!record.is_address_found);
        assert!(!record.is_title_found);
        assert!(!record.is_image_found);
        assert_eq!(record.website_status, WebsiteStatus::IsDown);
    }

    #[tokio::test]
    async fn test_enrich_insecure_only_site() {
        // Secure attempt hits a plaintext server and fails negotiation;
        // the insecure retry completes the record
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta property="og:title" content="Hello"></head></html>"#,
            ))
            .mount(&server)
            .await;

        let bare_host = server.uri().trim_start_matches("http://").to_string();

        let record = worker(Duration::from_secs(5))
            .enrich(&input(&bare_host))
            .await;

        assert_eq!(record.status_code, Field::Found(200));
        assert!(record.is_address_found);
        assert_eq!(record.title, Field::Found("Hello".to_string()));
        assert!(record.is_title_found);
        assert_eq!(record.website_status, WebsiteStatus::IsComplete);
    }
}
