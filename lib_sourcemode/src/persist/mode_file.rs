//! # Persisted Mode File
//!
//! Reads and writes the single persisted string (`"live"` or `"demo"`) that
//! seeds the mode across process restarts. Every failure path degrades
//! gracefully: a missing file, unreadable storage, or a garbage value loads
//! as Demo, and a failed write is logged and swallowed so it can never crash
//! or block a mode switch.

use std::fs;
use std::path::PathBuf;

use crate::core::state::DataMode;

/// Durable single-value store for the selected mode.
pub struct ModeFile {
    path: PathBuf,
}

impl ModeFile {
    /// Uses `path` as the backing file.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The default backing file, under the platform's local data directory
    /// (falling back to the current directory when none is known).
    pub fn default_location() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sigdeck")
            .join("data_source_mode")
    }

    /// Reads the persisted mode. Any storage error or unrecognized value
    /// yields the Demo default.
    pub fn load(&self) -> DataMode {
        match fs::read_to_string(&self.path) {
            Ok(raw) => DataMode::parse(&raw).unwrap_or(DataMode::Demo),
            Err(_) => DataMode::Demo,
        }
    }

    /// Best-effort write of the new mode. Failures are logged at warn and
    /// swallowed.
    pub fn store(&self, mode: DataMode) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::warn!(
                    "Could not create mode storage directory {}: {}",
                    parent.display(),
                    err
                );
                return;
            }
        }
        if let Err(err) = fs::write(&self.path, mode.as_str()) {
            log::warn!(
                "Could not persist data-source mode to {}: {}",
                self.path.display(),
                err
            );
        }
    }
}
