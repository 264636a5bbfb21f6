//! CSV export ingestion.
//!
//! Each data row carries an ISO-8601 timestamp in column 0 and a JSON payload
//! in column 1. Rows are decoded, noise-filtered and merged per identity,
//! keeping the most recent observation. Every row-level failure is logged and
//! skipped; a missing or unreadable file yields an empty result.

pub mod payload;
pub mod timestamp;

pub use payload::{FailurePayload, SchemaPolicy, decode_payload};
pub use timestamp::parse_timestamp;

use crate::core::{FailureRecord, Result, TrackerError};
use crate::storage::AddressedState;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Messages containing this are known noise and never enter the catalog.
pub const NOISE_SIGNATURE: &str = "RuntimeError: Working outside of application context.";

/// Row accounting for one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source_available: bool,
    pub rows_read: usize,
    pub skipped_short: usize,
    pub skipped_timestamp: usize,
    pub skipped_payload: usize,
    pub skipped_unreadable: usize,
    pub noise_filtered: usize,
    /// Rows that lost the merge to a row with the same identity.
    pub superseded: usize,
    pub records: usize,
}

impl IngestReport {
    pub fn skipped(&self) -> usize {
        self.skipped_short + self.skipped_timestamp + self.skipped_payload + self.skipped_unreadable
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    /// Sorted ascending by identity.
    pub records: Vec<FailureRecord>,
    pub report: IngestReport,
}

enum RowOutcome {
    Accepted(FailureRecord),
    Noise,
}

#[derive(Debug, Clone)]
pub struct RecordIngestor {
    policy: SchemaPolicy,
    noise_signatures: Vec<String>,
}

impl Default for RecordIngestor {
    fn default() -> Self {
        Self::new(SchemaPolicy::default())
    }
}

impl RecordIngestor {
    pub fn new(policy: SchemaPolicy) -> Self {
        Self {
            policy,
            noise_signatures: vec![NOISE_SIGNATURE.to_string()],
        }
    }

    /// Adds another substring that marks a message as noise.
    pub fn with_noise_signature(mut self, signature: impl Into<String>) -> Self {
        self.noise_signatures.push(signature.into());
        self
    }

    pub fn policy(&self) -> SchemaPolicy {
        self.policy
    }

    pub fn ingest<P: AsRef<Path>>(&self, csv_path: P, prior: &AddressedState) -> Vec<FailureRecord> {
        self.ingest_with_report(csv_path, prior).records
    }

    pub fn ingest_with_report<P: AsRef<Path>>(
        &self,
        csv_path: P,
        prior: &AddressedState,
    ) -> IngestOutcome {
        let csv_path = csv_path.as_ref();
        if !csv_path.exists() {
            warn!(path = %csv_path.display(), "CSV file not found, starting with an empty catalog");
            return IngestOutcome::default();
        }

        match File::open(csv_path) {
            Ok(file) => {
                let outcome = self.ingest_reader(file, prior);
                info!(
                    path = %csv_path.display(),
                    rows = outcome.report.rows_read,
                    records = outcome.report.records,
                    skipped = outcome.report.skipped(),
                    noise = outcome.report.noise_filtered,
                    "ingested CSV export"
                );
                outcome
            }
            Err(e) => {
                warn!(path = %csv_path.display(), error = %e, "could not read CSV file, starting with an empty catalog");
                IngestOutcome::default()
            }
        }
    }

    /// Ingests an already opened export. The first row is a header.
    pub fn ingest_reader<R: Read>(&self, reader: R, prior: &AddressedState) -> IngestOutcome {
        let mut report = IngestReport {
            source_available: true,
            ..IngestReport::default()
        };
        let mut merged: BTreeMap<String, FailureRecord> = BTreeMap::new();

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        for (index, row) in csv_reader.records().enumerate() {
            // Header occupies line 1.
            let fallback_line = index as u64 + 2;
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    report.skipped_unreadable += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                    warn!(line, error = %e, "could not read CSV row");
                    if e.is_io_error() {
                        break;
                    }
                    continue;
                }
            };
            report.rows_read += 1;
            let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);

            let record = match self.parse_row(&row, line, prior) {
                Ok(RowOutcome::Accepted(record)) => record,
                Ok(RowOutcome::Noise) => {
                    report.noise_filtered += 1;
                    continue;
                }
                Err(e) => {
                    match e {
                        TrackerError::MalformedRow { .. } => {
                            report.skipped_short += 1;
                            debug!(line, error = %e, "skipping short row");
                        }
                        TrackerError::InvalidTimestamp(_) => {
                            report.skipped_timestamp += 1;
                            warn!(line, error = %e, "could not parse timestamp");
                        }
                        _ => {
                            report.skipped_payload += 1;
                            warn!(line, error = %e, "could not parse row payload");
                        }
                    }
                    continue;
                }
            };

            match merged.entry(record.identity.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    report.superseded += 1;
                    if record.observed_at > slot.get().observed_at {
                        slot.insert(record);
                    }
                }
            }
        }

        let records: Vec<FailureRecord> = merged.into_values().collect();
        report.records = records.len();
        IngestOutcome { records, report }
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        line: u64,
        prior: &AddressedState,
    ) -> Result<RowOutcome> {
        let (Some(raw_ts), Some(raw_payload)) = (row.get(0), row.get(1)) else {
            return Err(TrackerError::MalformedRow {
                line,
                reason: format!("expected at least 2 columns, found {}", row.len()),
            });
        };

        let observed_at = parse_timestamp(raw_ts)?;
        let payload = decode_payload(raw_payload, self.policy)?;

        if self.is_noise(&payload.message) {
            return Ok(RowOutcome::Noise);
        }

        let record = FailureRecord::new(
            payload.source_file,
            payload.test_name,
            payload.message,
            observed_at,
        );
        let addressed = prior.get(&record.identity).copied().unwrap_or(false);
        Ok(RowOutcome::Accepted(record.with_addressed(addressed)))
    }

    fn is_noise(&self, message: &str) -> bool {
        self.noise_signatures
            .iter()
            .any(|signature| message.contains(signature.as_str()))
    }
}
