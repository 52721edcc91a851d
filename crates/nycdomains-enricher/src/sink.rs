//! Durable run output.
//!
//! Each batch run streams its finished records into an append-only JSON
//! Lines file. The file doubles as the resume log: on restart the
//! coordinator seeds its skip set from the domains already present, so an
//! interrupted run can be re-launched without losing or re-fetching
//! completed work. Appends are serialized by ownership; the coordinator's
//! drain loop is the only writer.

use crate::error::Result;
use nycdomains_core::EnrichedRecord;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Append-only run output file.
pub struct RunOutput {
    file: File,
}

impl RunOutput {
    /// Open the run output for appending, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self { file })
    }

    /// Append one finished record and flush it to disk.
    ///
    /// The record is durable once this returns; a crash mid-run loses at
    /// most the record currently in flight.
    pub fn append(&mut self, record: &EnrichedRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        Ok(())
    }

    /// Collect the domains already present in an output file.
    ///
    /// A missing file is an empty set. Unreadable lines (for example a
    /// partial trailing line after a crash) are logged and skipped.
    pub fn processed_domains(path: impl AsRef<Path>) -> Result<HashSet<String>> {
        let contents = match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };

        let mut domains = HashSet::new();
        for line in contents.lines().filter(|line| !line.trim().is_empty()) {
            match serde_json::from_str::<serde_json::Value>(line) {
                Ok(value) => {
                    if let Some(domain) = value.get("domain").and_then(|v| v.as_str()) {
                        domains.insert(domain.to_string());
                    }
                }
                Err(e) => tracing::warn!("Skipping unreadable run output line: {}", e),
            }
        }

        Ok(domains)
    }

    /// Load a finished run back for the store upsert stage.
    pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<EnrichedRecord>> {
        let contents = std::fs::read_to_string(path.as_ref())?;

        let mut records = Vec::new();
        for line in contents.lines().filter(|line| !line.trim().is_empty()) {
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unreadable run output line: {}", e),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nycdomains_core::{DomainName, Field, WebsiteStatus};

    fn record(domain: &str) -> EnrichedRecord {
        EnrichedRecord {
            domain: DomainName::new(domain).expect("valid domain"),
            registration_date: "2025-02-08T00:00:00Z".parse().expect("valid timestamp"),
            category: "ORG".to_string(),
            status_code: Field::Found(200),
            final_address: Field::Found(format!("https://{domain}/")),
            title: Field::NotFound,
            description: Field::NotFound,
            image_url: Field::NotFound,
            is_address_found: true,
            is_title_found: false,
            is_image_found: false,
            website_status: WebsiteStatus::IsLive,
            last_updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_and_load() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("run.jsonl");

        let mut output = RunOutput::open(&path).expect("open output");
        output.append(&record("a.nyc")).expect("append a");
        output.append(&record("b.nyc")).expect("append b");

        let records = RunOutput::load_records(&path).expect("load records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].domain.as_str(), "a.nyc");
        assert_eq!(records[1].domain.as_str(), "b.nyc");
    }

    #[test]
    fn test_processed_domains_seed() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("run.jsonl");

        let mut output = RunOutput::open(&path).expect("open output");
        output.append(&record("a.nyc")).expect("append a");
        output.append(&record("b.nyc")).expect("append b");

        let domains = RunOutput::processed_domains(&path).expect("read domains");
        assert_eq!(domains.len(), 2);
        assert!(domains.contains("a.nyc"));
        assert!(domains.contains("b.nyc"));
    }

    #[test]
    fn test_missing_file_is_empty_set() {
        let domains =
            RunOutput::processed_domains("/nonexistent/run.jsonl").expect("missing file tolerated");
        assert!(domains.is_empty());
    }

    #[test]
    fn test_partial_trailing_line_is_skipped() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("run.jsonl");

        let mut output = RunOutput::open(&path).expect("open output");
        output.append(&record("a.nyc")).expect("append a");

        // Simulate a crash mid-append
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .expect("reopen file");
        write!(file, "{{\"domain\":\"trunc").expect("write partial line");
        drop(file);

        let domains = RunOutput::processed_domains(&path).expect("read domains");
        assert_eq!(domains.len(), 1);
        assert!(domains.contains("a.nyc"));

        let records = RunOutput::load_records(&path).expect("load records");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_reopen_appends() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("run.jsonl");

        {
            let mut output = RunOutput::open(&path).expect("open output");
            output.append(&record("a.nyc")).expect("append a");
        }
        {
            let mut output = RunOutput::open(&path).expect("reopen output");
            output.append(&record("b.nyc")).expect("append b");
        }

        let records = RunOutput::load_records(&path).expect("load records");
        assert_eq!(records.len(), 2);
    }
}
