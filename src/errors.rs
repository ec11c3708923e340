//! Typed errors for codequal operations.
//!
//! The pipeline never terminates the process itself; every failure surfaces
//! as a `CodequalError` (or an `anyhow::Error` wrapping one at the command
//! boundary) and the binary decides the exit code.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodequalError {
    /// File system I/O failure with the path it happened on.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fatal directory traversal failure. Per-file open errors are not
    /// fatal; this covers enumeration of the tree itself.
    #[error("directory walk failed under {root}: {message}")]
    Walk { root: PathBuf, message: String },

    /// A metric write arrived for a file the walker never registered.
    /// Recoverable: callers log and skip the write.
    #[error("file was never registered: {id}")]
    UnregisteredFile { id: String },

    /// Report serialization or publish failure. Fatal to the run.
    #[error("failed to write report to {path}: {message}")]
    Report { path: PathBuf, message: String },

    /// An external tool could not be invoked or installed.
    #[error("tool `{tool}` failed: {message}")]
    Tool { tool: String, message: String },

    /// The run was cancelled before completion. No report is published.
    #[error("run cancelled")]
    Cancelled,
}

impl CodequalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn walk(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Walk {
            root: root.into(),
            message: message.into(),
        }
    }

    pub fn report(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Report {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether the pipeline may continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::UnregisteredFile { .. })
    }
}
