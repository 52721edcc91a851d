//! nycdomains Feed - Registration feed ingestion.
//!
//! This crate pulls newly registered `.nyc` domains from the NYC OpenData
//! endpoint. Pagination walks fixed-size `$offset` windows in `$order=:id`
//! order and terminates on the first empty page; an optional
//! registration-date window narrows the pull for incremental ingests.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;

// Re-export commonly used types
pub use client::FeedClient;
pub use error::{FeedError, Result};
