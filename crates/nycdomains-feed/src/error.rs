//! Feed client error types.

use thiserror::Error;

/// Errors from the registration-feed client.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The configured feed endpoint is not a valid URL.
    #[error("invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP request failed.
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A feed row could not be decoded.
    #[error("failed to decode feed row: {0}")]
    Decode(String),
}

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
