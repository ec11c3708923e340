//! Serializes the final snapshot to the metrics report artifact.
//!
//! Invoked exactly once per run, after the worker pool's completion
//! barrier. The report is published atomically: serialized to a sibling
//! temp file, then renamed into place, so a failed run never leaves a
//! partial `report.json` behind.

use crate::core::Snapshot;
use crate::errors::CodequalError;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes and publishes the snapshot. Any failure is fatal to the
    /// run and is returned, never swallowed.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), CodequalError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| CodequalError::report(&self.path, e.to_string()))?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json + "\n")
            .map_err(|e| CodequalError::report(&tmp, e.to_string()))?;

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(CodequalError::report(&self.path, e.to_string()));
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "report.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
