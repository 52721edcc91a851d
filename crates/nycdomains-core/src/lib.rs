//! nycdomains Core - Foundation crate for the nycdomains enrichment pipeline.
//!
//! This crate provides the shared types, error handling, and configuration
//! management that all other nycdomains crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`DomainName`, `Field`, `WebsiteStatus`)
//! - [`records`] - The input and output record shapes of the pipeline
//!
//! # Example
//!
//! ```rust
//! use nycdomains_core::{Field, WebsiteStatus};
//!
//! let title: Field<String> = Field::Found("City of New York".to_string());
//! assert!(title.is_found());
//! assert_eq!(Field::<String>::Error.to_string(), "Error");
//! assert_eq!(WebsiteStatus::IsComplete.to_string(), "is_complete");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod records;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, EnrichmentConfig, FeedConfig, StoreConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use records::{DomainRecord, EnrichedRecord};
pub use types::{DomainName, Field, WebsiteStatus};
