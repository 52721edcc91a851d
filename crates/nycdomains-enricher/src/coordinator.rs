//! Batch coordination.
//!
//! Drives enrichment workers over an input collection under one of two
//! interchangeable scheduling strategies: strictly sequential, or
//! bounded-concurrent with results streamed to the run output in
//! completion order, so a fast domain is persisted before a slower one
//! submitted earlier. Before any work starts the existing output is read
//! into a skip set, which makes an interrupted batch safely restartable.

use crate::error::{EnrichError, Result};
use crate::sink::RunOutput;
use crate::worker::Enrich;
use futures::stream::{FuturesUnordered, StreamExt};
use nycdomains_core::DomainRecord;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Default cap on simultaneous outbound fetches.
///
/// Caps outbound connections per run, independent of machine resources.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Counts from one coordinator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Domains enriched in this run.
    pub enriched: usize,
    /// Input domains skipped because the output already contained them.
    pub skipped: usize,
}

/// Schedules enrichment workers over a batch of input records.
pub struct BatchCoordinator<E> {
    worker: Arc<E>,
    max_concurrent: usize,
}

impl<E: Enrich + 'static> BatchCoordinator<E> {
    /// Create a coordinator over a shared worker.
    #[must_use]
    pub fn new(worker: Arc<E>) -> Self {
        Self {
            worker,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Set the maximum number of concurrent fetches.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Enrich one domain at a time, strictly in input order.
    ///
    /// Each result is appended to the output immediately after it
    /// completes.
    pub async fn run_sequential(
        &self,
        records: &[DomainRecord],
        output_path: &Path,
    ) -> Result<RunReport> {
        let pending = self.pending(records, output_path)?;
        let skipped = records.len() - pending.len();
        let mut output = RunOutput::open(output_path)?;

        let mut enriched = 0;
        for record in pending {
            let result = self.worker.enrich(record).await;
            output.append(&result)?;
            enriched += 1;
        }

        tracing::info!(
            "Sequential run finished: {} enriched, {} skipped",
            enriched,
            skipped
        );
        Ok(RunReport { enriched, skipped })
    }

    /// Enrich up to `max_concurrent` domains simultaneously.
    ///
    /// Completions are appended to the output as they finish, not in
    /// input order. The drain loop below is the sole owner of the output
    /// file, so appends are serialized without a lock.
    pub async fn run_concurrent(
        &self,
        records: &[DomainRecord],
        output_path: &Path,
    ) -> Result<RunReport> {
        let pending = self.pending(records, output_path)?;
        let skipped = records.len() - pending.len();
        let mut output = RunOutput::open(output_path)?;

        let mut futures = FuturesUnordered::new();
        let mut enriched = 0;

        for record in pending {
            let worker = Arc::clone(&self.worker);
            let record = record.clone();
            futures.push(async move { worker.enrich(&record).await });

            // Admission limit: drain one completion before admitting more
            while futures.len() >= self.max_concurrent {
                if let Some(result) = futures.next().await {
                    output.append(&result)?;
                    enriched += 1;
                }
            }
        }

        while let Some(result) = futures.next().await {
            output.append(&result)?;
            enriched += 1;
        }

        tracing::info!(
            "Concurrent run finished: {} enriched, {} skipped",
            enriched,
            skipped
        );
        Ok(RunReport { enriched, skipped })
    }

    /// Filter the input down to domains not yet present in the output.
    ///
    /// Also drops repeated domains within the batch itself, so every
    /// attempted domain yields exactly one output record.
    fn pending<'a>(
        &self,
        records: &'a [DomainRecord],
        output_path: &Path,
    ) -> Result<Vec<&'a DomainRecord>> {
        let mut seen = RunOutput::processed_domains(output_path)?;
        if !seen.is_empty() {
            tracing::info!(
                "Resuming run: {} domains already in {}",
                seen.len(),
                output_path.display()
            );
        }

        Ok(records
            .iter()
            .filter(|record| seen.insert(record.domain.as_str().to_string()))
            .collect())
    }
}

/// Read a standalone batch input file (JSON Lines of input records).
///
/// A row missing a required field aborts the batch before any work is
/// done; an unreadable file does the same.
pub fn read_input_records(path: &Path) -> Result<Vec<DomainRecord>> {
    let contents = std::fs::read_to_string(path)?;

    let mut records = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: DomainRecord = serde_json::from_str(line).map_err(|e| {
            EnrichError::InvalidInput(format!("line {}: {e}", number + 1))
        })?;
        records.push(record);
    }

    Ok(records)
}
