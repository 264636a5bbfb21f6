//! Durable "addressed" flags, keyed by failure identity.
//!
//! The on-disk format is a single pretty-printed JSON object mapping identity
//! strings to booleans. Existing files written by other tools read back as-is.

use crate::core::{Result, TrackerError};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

/// Identity -> addressed flag.
pub type AddressedState = BTreeMap<String, bool>;

// ============================================================================
// Addressed State Store
// ============================================================================

#[derive(Debug, Clone)]
pub struct AddressedStateStore {
    path: PathBuf,
}

impl AddressedStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the persisted mapping.
    ///
    /// Never fails: a missing file yields an empty mapping, and an unreadable
    /// or corrupt file is logged and also yields an empty mapping.
    pub fn load(&self) -> AddressedState {
        match self.try_load() {
            Ok(Some(state)) => {
                debug!(path = %self.path.display(), entries = state.len(), "loaded addressed state");
                state
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no addressed state file, starting empty");
                AddressedState::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not load addressed state, starting empty");
                AddressedState::new()
            }
        }
    }

    fn try_load(&self) -> Result<Option<AddressedState>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TrackerError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        // A top-level array or a non-boolean value fails here as well.
        let state: AddressedState = serde_json::from_slice(&data)?;
        Ok(Some(state))
    }

    /// Overwrites the file with the full mapping.
    ///
    /// The mapping is written to a temporary file next to the target and then
    /// renamed over it, so readers see either the old or the new contents.
    /// Failures are logged and returned to the caller.
    pub fn save(&self, state: &AddressedState) -> Result<()> {
        self.try_save(state).inspect_err(|e| {
            error!(path = %self.path.display(), error = %e, "could not save addressed state");
        })
    }

    fn try_save(&self, state: &AddressedState) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|source| self.write_error(source))?;

        let serialized = serde_json::to_string_pretty(state)?;
        let mut temp = NamedTempFile::new_in(&parent).map_err(|source| self.write_error(source))?;
        temp.write_all(serialized.as_bytes())
            .map_err(|source| self.write_error(source))?;
        temp.as_file()
            .sync_all()
            .map_err(|source| self.write_error(source))?;
        temp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> TrackerError {
        TrackerError::Write {
            path: self.path.clone(),
            source,
        }
    }
}
