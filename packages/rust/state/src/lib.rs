//! Selection state store.
//!
//! The [`StateStore`] is the only component that writes persistent
//! state. Saves go to a dot-prefixed temp file in the target directory
//! followed by an atomic rename, so a crash mid-run never leaves a
//! partially written state file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use draftmill_shared::{CURRENT_STATE_VERSION, DraftmillError, Result, SelectionState};

/// Durable store for the selection history, backed by one JSON file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store for the state file at `path`. No I/O happens here.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the selection state.
    ///
    /// An absent file is a valid initial condition and yields an empty
    /// state. An unreadable or malformed file is a persistence error.
    pub fn load(&self) -> Result<SelectionState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file, starting with empty history");
            return Ok(SelectionState::default());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| DraftmillError::io(&self.path, e))?;

        let state: SelectionState = serde_json::from_str(&content).map_err(|e| {
            DraftmillError::Persistence(format!(
                "corrupt state file {}: {e}",
                self.path.display()
            ))
        })?;

        if state.schema_version != CURRENT_STATE_VERSION {
            return Err(DraftmillError::Persistence(format!(
                "unsupported state schema_version: {} (expected {})",
                state.schema_version, CURRENT_STATE_VERSION
            )));
        }

        debug!(records = state.records.len(), "state loaded");
        Ok(state)
    }

    /// Persist the state atomically (write temp file, then rename).
    pub fn save(&self, state: &SelectionState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| DraftmillError::Persistence(format!("state serialization failed: {e}")))?;

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| DraftmillError::io(parent, e))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                DraftmillError::Persistence(format!(
                    "state path has no file name: {}",
                    self.path.display()
                ))
            })?
            .to_string_lossy();
        let temp = parent.join(format!(".{file_name}.tmp"));

        std::fs::write(&temp, json).map_err(|e| DraftmillError::io(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| DraftmillError::io(&self.path, e))?;

        info!(
            path = %self.path.display(),
            records = state.records.len(),
            "state saved"
        );
        Ok(())
    }
}
