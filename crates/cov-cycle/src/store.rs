// store.rs — whole-state snapshot persistence.
//
// The ledger is one aggregate snapshot, so it persists as one JSON file:
// load at the start of a transaction, transform in memory, save at the
// end. Admission attempts stay serialized because every writer follows
// that load→transform→save discipline through the ledger's `&mut self`
// methods.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cycle::CycleLedger;
use crate::error::CycleError;

/// File-backed snapshot store for the whole ledger.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the given file path. Parent directories
    /// are created on first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger, or an empty one when no snapshot exists yet.
    pub fn load(&self) -> Result<CycleLedger, CycleError> {
        if !self.path.exists() {
            return Ok(CycleLedger::new());
        }
        let json = fs::read_to_string(&self.path).map_err(|source| CycleError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let ledger: CycleLedger = serde_json::from_str(&json)?;
        Ok(ledger)
    }

    /// Save the ledger (creates or overwrites the snapshot).
    pub fn save(&self, ledger: &CycleLedger) -> Result<(), CycleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CycleError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(ledger)?;
        fs::write(&self.path, json).map_err(|source| CycleError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}
