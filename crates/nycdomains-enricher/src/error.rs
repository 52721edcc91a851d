//! Enrichment error types.
//!
//! Per-domain fetch and extraction failures are not errors at this level;
//! they degrade the affected record to its sentinel state inside the
//! worker. The variants here are the batch-fatal conditions only.

use thiserror::Error;

/// Errors that abort an enrichment batch.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Batch input is missing a required field or otherwise malformed.
    #[error("invalid batch input: {0}")]
    InvalidInput(String),

    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Run output file could not be read or written.
    #[error("run output error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded for the run output.
    #[error("failed to encode record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichError>;
