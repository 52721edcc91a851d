//! nycdomains Enricher - The URL-enrichment engine.
//!
//! Given a batch of registered domains, this crate probes each one over
//! the network, classifies its reachability, extracts page metadata, and
//! streams normalized output records to a durable run file, all under
//! partial-failure conditions. One bad domain never aborts a batch.
//!
//! # Pipeline
//!
//! ```text
//! DomainRecord -> resolver (address + transport fallback)
//!              -> fetch -> extractor (title/description/image)
//!              -> classifier (found flags + website status)
//!              -> EnrichedRecord -> run output append
//! ```
//!
//! # Modules
//!
//! - [`resolver`] - Address normalization and the secure->insecure fallback
//! - [`extractor`] - Pure metadata extraction from fetched page content
//! - [`classifier`] - The found-flag and status decision table
//! - [`worker`] - Per-domain orchestration with the never-raise contract
//! - [`sink`] - Append-only run output and resume bookkeeping
//! - [`coordinator`] - Sequential and bounded-concurrent batch scheduling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classifier;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod resolver;
pub mod sink;
pub mod worker;

// Re-export commonly used types
pub use classifier::{classify, Classification};
pub use coordinator::{read_input_records, BatchCoordinator, RunReport, DEFAULT_MAX_CONCURRENT};
pub use error::{EnrichError, Result};
pub use extractor::{extract, PageMetadata};
pub use resolver::{ensure_scheme, insecure_variant, FetchClient, FetchedPage};
pub use sink::RunOutput;
pub use worker::{Enrich, Enricher};
