use crate::catalog::ErrorCatalog;
use crate::core::{Result, TrackerError};
use crate::ingest::{RecordIngestor, SchemaPolicy};
use crate::storage::AddressedStateStore;
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_PORT: u16 = 6969;

/// Static configuration, fixed at process start.
#[derive(Debug, Clone, Args)]
pub struct TrackerConfig {
    /// CSV export to ingest
    #[arg(long = "csv", env = "FAILTRACK_CSV", default_value = "errors.csv")]
    pub csv_path: PathBuf,

    /// JSON file holding the addressed flags
    #[arg(long = "state", env = "FAILTRACK_STATE", default_value = "addressed_errors.json")]
    pub state_path: PathBuf,

    /// Records per page
    #[arg(long, env = "FAILTRACK_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, env = "FAILTRACK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "FAILTRACK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// How rows missing payload fields are treated: strict or lenient
    #[arg(long = "schema", env = "FAILTRACK_SCHEMA", default_value = "strict")]
    pub schema_policy: SchemaPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("errors.csv"),
            state_path: PathBuf::from("addressed_errors.json"),
            page_size: DEFAULT_PAGE_SIZE,
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            schema_policy: SchemaPolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(TrackerError::Config("page size must be greater than 0".to_string()));
        }
        if self.csv_path.as_os_str().is_empty() || self.state_path.as_os_str().is_empty() {
            return Err(TrackerError::Config("CSV and state paths must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ingestor(&self) -> RecordIngestor {
        RecordIngestor::new(self.schema_policy)
    }

    pub fn state_store(&self) -> AddressedStateStore {
        AddressedStateStore::new(&self.state_path)
    }

    pub fn load_catalog(&self) -> ErrorCatalog {
        ErrorCatalog::load(&self.csv_path, self.state_store(), &self.ingestor())
    }
}
