//! Protocol resolution and transport fallback.
//!
//! Bare domain names are normalized to secure-transport addresses before
//! fetching. When the secure attempt fails specifically because the
//! encrypted channel could not be negotiated, one retry is made over the
//! insecure scheme on the same host and path; many long-registered
//! domains still serve plain HTTP only and would otherwise be
//! misclassified as down. Every other transport failure is terminal with
//! zero retries.

use crate::error::Result;
use std::time::Duration;

/// Ensure the address starts with `http://` or `https://`.
#[must_use]
pub fn ensure_scheme(domain: &str) -> String {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// Substitute the insecure scheme, leaving host and path untouched.
#[must_use]
pub fn insecure_variant(address: &str) -> String {
    address.replacen("https://", "http://", 1)
}

/// The terminal result of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status of the final response.
    pub status_code: u16,
    /// Address the request landed on after redirects.
    pub final_address: String,
    /// Response body.
    pub body: String,
}

/// Classification of one fetch attempt.
///
/// The fallback decision is made by matching on this closed set; typed
/// errors never drive control flow across the attempt boundary.
#[derive(Debug)]
enum AttemptOutcome {
    Success(FetchedPage),
    SecurityFailure,
    TransportFailure,
}

/// Shared HTTP client for one enrichment run.
///
/// Constructed once per batch and passed by reference to every worker so
/// connection pooling is shared across fetches.
pub struct FetchClient {
    http: reqwest::Client,
}

impl FetchClient {
    /// Create a fetch client with the given per-request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }

    /// Fetch a domain, falling back to insecure transport exactly once.
    ///
    /// Returns `None` when the fetch is irrecoverable; the caller records
    /// the terminal sentinel state for the domain.
    pub async fn fetch_with_fallback(&self, domain: &str) -> Option<FetchedPage> {
        let address = ensure_scheme(domain);

        match self.attempt(&address).await {
            AttemptOutcome::Success(page) => Some(page),
            AttemptOutcome::SecurityFailure => {
                tracing::warn!(
                    "Security negotiation failed for {}, trying insecure transport",
                    address
                );
                let insecure = insecure_variant(&address);
                match self.attempt(&insecure).await {
                    AttemptOutcome::Success(page) => Some(page),
                    AttemptOutcome::SecurityFailure | AttemptOutcome::TransportFailure => {
                        tracing::error!("Insecure fallback failed for {}", insecure);
                        None
                    }
                }
            }
            AttemptOutcome::TransportFailure => {
                tracing::error!("Fetch failed for {}", address);
                None
            }
        }
    }

    async fn attempt(&self, address: &str) -> AttemptOutcome {
        let response = match self.http.get(address).send().await {
            Ok(response) => response,
            Err(e) => return classify_fetch_error(&e),
        };

        let status_code = response.status().as_u16();
        let final_address = response.url().to_string();

        match response.text().await {
            Ok(body) => AttemptOutcome::Success(FetchedPage {
                status_code,
                final_address,
                body,
            }),
            Err(e) => {
                tracing::debug!("Body read failed for {}: {}", final_address, e);
                AttemptOutcome::TransportFailure
            }
        }
    }
}

/// Sort a failed attempt into the fallback decision set.
///
/// Timeouts are checked first: a handshake that times out is a timeout,
/// not a negotiation failure, and must not trigger the insecure retry.
fn classify_fetch_error(error: &reqwest::Error) -> AttemptOutcome {
    if error.is_timeout() {
        return AttemptOutcome::TransportFailure;
    }

    if is_security_failure(error) {
        AttemptOutcome::SecurityFailure
    } else {
        AttemptOutcome::TransportFailure
    }
}

/// Whether the error chain points at a TLS negotiation failure.
///
/// reqwest does not expose a typed TLS error, so the source chain is
/// scanned for the handshake and certificate failures surfaced by the
/// TLS backend.
fn is_security_failure(error: &reqwest::Error) -> bool {
    const INDICATORS: [&str; 7] = [
        "tls",
        "ssl",
        "certificate",
        "handshake",
        "corrupt message",
        "invalid message",
        "unsupported protocol version",
    ];

    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        let text = err.to_string().to_ascii_lowercase();
        if INDICATORS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        source = err.source();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_ensure_scheme_prepends_https() {
        assert_eq!(ensure_scheme("example.nyc"), "https://example.nyc");
    }

    #[test]
    fn test_ensure_scheme_keeps_existing() {
        assert_eq!(ensure_scheme("https://example.nyc"), "https://example.nyc");
        assert_eq!(ensure_scheme("http://example.nyc"), "http://example.nyc");
    }

    #[test]
    fn test_insecure_variant_swaps_scheme_only() {
        assert_eq!(
            insecure_variant("https://example.nyc/about"),
            "http://example.nyc/about"
        );
        // Already-insecure addresses are untouched
        assert_eq!(
            insecure_variant("http://example.nyc/about"),
            "http://example.nyc/about"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client =
            FetchClient::new(Duration::from_secs(5), "nycdomains-test").expect("build client");
        let page = client
            .fetch_with_fallback(&server.uri())
            .await
            .expect("fetch succeeds");

        assert_eq!(page.status_code, 200);
        assert_eq!(page.body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("{}/landing", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200).set_body_string("landed"))
            .mount(&server)
            .await;

        let client =
            FetchClient::new(Duration::from_secs(5), "nycdomains-test").expect("build client");
        let page = client
            .fetch_with_fallback(&server.uri())
            .await
            .expect("fetch succeeds");

        assert_eq!(page.status_code, 200);
        assert!(page.final_address.ends_with("/landing"));
    }

    #[tokio::test]
    async fn test_timeout_makes_exactly_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client =
            FetchClient::new(Duration::from_millis(250), "nycdomains-test").expect("build client");
        let page = client.fetch_with_fallback(&server.uri()).await;

        assert!(page.is_none());
        // Mock expectation verifies no second attempt was made
        server.verify().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_terminal() {
        // Bind then drop to find a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let client =
            FetchClient::new(Duration::from_secs(2), "nycdomains-test").expect("build client");
        let page = client
            .fetch_with_fallback(&format!("http://127.0.0.1:{port}"))
            .await;

        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_security_failure_falls_back_to_insecure() {
        // Speaking TLS to a plaintext server fails the negotiation, which
        // must trigger exactly one insecure retry of the same host
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
            .mount(&server)
            .await;

        let host = server.uri().trim_start_matches("http://").to_string();

        let client =
            FetchClient::new(Duration::from_secs(5), "nycdomains-test").expect("build client");
        let page = client
            .fetch_with_fallback(&host)
            .await
            .expect("insecure fallback succeeds");

        assert_eq!(page.status_code, 200);
        assert_eq!(page.body, "plain");
        assert!(page.final_address.starts_with("http://"));
    }
}
