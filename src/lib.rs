// ============================================================================
// failtrack Library
// ============================================================================

pub mod catalog;
pub mod config;
pub mod core;
pub mod ingest;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use catalog::{CatalogPage, CatalogStats, ErrorCatalog, Pagination, RecordFilter, StatusFilter};
pub use config::TrackerConfig;
pub use crate::core::{FailureRecord, Result, TrackerError};
pub use ingest::{IngestReport, NOISE_SIGNATURE, RecordIngestor, SchemaPolicy};
pub use storage::{AddressedState, AddressedStateStore};
pub use web::{AppState, build_router};
