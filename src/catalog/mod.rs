//! The in-memory failure catalog.
//!
//! `ErrorCatalog` owns the merged records and the addressed-state mapping.
//! Toggles update both and persist the full mapping before returning.

pub mod filter;
pub mod pagination;

pub use filter::{RecordFilter, StatusFilter};
pub use pagination::Pagination;

use crate::core::{FailureRecord, Result};
use crate::ingest::{IngestReport, RecordIngestor};
use crate::storage::{AddressedState, AddressedStateStore};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub records: Vec<FailureRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub addressed: usize,
    pub unaddressed: usize,
    pub progress_percent: f64,
}

impl CatalogStats {
    fn compute(records: &[FailureRecord]) -> Self {
        let total = records.len();
        let addressed = records.iter().filter(|r| r.addressed).count();
        let progress_percent = if total > 0 {
            let pct = addressed as f64 / total as f64 * 100.0;
            // One decimal, ties to even: 1 of 16 reports 6.2.
            (pct * 10.0).round_ties_even() / 10.0
        } else {
            0.0
        };
        Self {
            total,
            addressed,
            unaddressed: total - addressed,
            progress_percent,
        }
    }
}

pub struct ErrorCatalog {
    records: Vec<FailureRecord>,
    store: AddressedStateStore,
    state: AddressedState,
    report: IngestReport,
}

impl ErrorCatalog {
    /// Loads persisted flags, then ingests the CSV export against them.
    pub fn load<P: AsRef<Path>>(
        csv_path: P,
        store: AddressedStateStore,
        ingestor: &RecordIngestor,
    ) -> Self {
        let state = store.load();
        let outcome = ingestor.ingest_with_report(csv_path, &state);
        let mut catalog = Self::from_records(outcome.records, store, state);
        catalog.report = outcome.report;
        catalog
    }

    pub fn from_records(
        mut records: Vec<FailureRecord>,
        store: AddressedStateStore,
        state: AddressedState,
    ) -> Self {
        records.sort_by(|a, b| a.identity.cmp(&b.identity));
        Self {
            records,
            store,
            state,
            report: IngestReport::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn get(&self, identity: &str) -> Option<&FailureRecord> {
        self.position(identity).map(|idx| &self.records[idx])
    }

    pub fn addressed_state(&self) -> &AddressedState {
        &self.state
    }

    pub fn store(&self) -> &AddressedStateStore {
        &self.store
    }

    pub fn ingest_report(&self) -> &IngestReport {
        &self.report
    }

    pub fn list_page(&self, page: usize, page_size: usize) -> CatalogPage {
        let pagination = Pagination::new(page, page_size, self.records.len());
        CatalogPage {
            records: pagination.slice(&self.records).to_vec(),
            pagination,
        }
    }

    /// Like [`list_page`](Self::list_page), over the records matching `filter`.
    pub fn search(&self, filter: &RecordFilter, page: usize, page_size: usize) -> CatalogPage {
        if filter.is_empty() {
            return self.list_page(page, page_size);
        }
        let matching: Vec<&FailureRecord> =
            self.records.iter().filter(|r| filter.matches(r)).collect();
        let pagination = Pagination::new(page, page_size, matching.len());
        CatalogPage {
            records: pagination.slice(&matching).iter().map(|r| (*r).clone()).collect(),
            pagination,
        }
    }

    /// Flips the addressed flag for `identity` and persists the mapping.
    ///
    /// An identity absent from the persisted mapping becomes `true`. The
    /// identity need not be in the catalog. If the write fails the error is
    /// returned, but the in-memory flag has already changed.
    pub fn toggle(&mut self, identity: &str) -> Result<bool> {
        let addressed = match self.state.get(identity) {
            Some(current) => !current,
            None => true,
        };
        self.state.insert(identity.to_string(), addressed);

        if let Some(idx) = self.position(identity) {
            self.records[idx].addressed = addressed;
        }

        self.store.save(&self.state)?;
        info!(identity, addressed, "toggled addressed flag");
        Ok(addressed)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::compute(&self.records)
    }

    fn position(&self, identity: &str) -> Option<usize> {
        self.records
            .binary_search_by(|r| r.identity.as_str().cmp(identity))
            .ok()
    }
}
