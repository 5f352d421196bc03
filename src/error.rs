//! Error taxonomy for one update run.
//!
//! # Design Decisions
//! - One enum for everything after configuration is resolved
//! - Config problems live in `config::loader::ConfigError` and never reach here
//! - `phase()` tags every error for the terminal log line

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can terminate an update run.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The external fetch program is not on `PATH`.
    #[error("fetch tool '{tool}' is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    /// The fetch program failed or returned nothing usable.
    #[error("fetch from {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// The fetched body is not a valid header list.
    #[error("invalid data from remote source: {0}")]
    Validation(String),

    /// The pre-update document could not be copied aside.
    #[error("failed to snapshot {}: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The new document could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The restart command could not be run or exited non-zero.
    #[error("restart command '{command}' failed: {reason}")]
    Restart { command: String, reason: String },

    /// The dependent service logged an error attributable to the change.
    #[error("regression detected in {} at {at}: {record}", .log.display())]
    DetectedRegression {
        log: PathBuf,
        at: DateTime<Utc>,
        record: String,
    },

    /// The dependent log could not be read while monitoring.
    #[error("failed to read {}: {source}", .path.display())]
    Monitor {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Restoring the previous state failed. Logged, never escalated.
    #[error("rollback incomplete: {0}")]
    Rollback(String),
}

impl UpdateError {
    /// Transaction phase the error belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            UpdateError::ToolUnavailable { .. } => Phase::Preflight,
            UpdateError::Fetch { .. } | UpdateError::Validation(_) => Phase::Fetch,
            UpdateError::Snapshot { .. } => Phase::Backup,
            UpdateError::Write { .. } => Phase::Write,
            UpdateError::Restart { .. } => Phase::Restart,
            UpdateError::DetectedRegression { .. } | UpdateError::Monitor { .. } => Phase::Monitor,
            UpdateError::Rollback(_) => Phase::Rollback,
        }
    }
}

/// Named steps of the update transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Preflight,
    Fetch,
    Backup,
    Write,
    Restart,
    Monitor,
    Rollback,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Preflight => "preflight",
            Phase::Fetch => "fetch",
            Phase::Backup => "backup",
            Phase::Write => "write",
            Phase::Restart => "restart",
            Phase::Monitor => "monitor",
            Phase::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

/// Result type for update operations.
pub type UpdateResult<T> = Result<T, UpdateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_tags() {
        let err = UpdateError::Validation("missing headers".into());
        assert_eq!(err.phase(), Phase::Fetch);
        assert_eq!(err.phase().to_string(), "fetch");

        let err = UpdateError::Restart {
            command: "systemctl restart traefik".into(),
            reason: "exit status: 1".into(),
        };
        assert_eq!(err.phase(), Phase::Restart);
        assert!(err.to_string().contains("systemctl restart traefik"));
    }
}
