//! The safe-update transaction.
//!
//! # States
//! ```text
//! CheckTool → Fetch → Decide ─┬─ UpToDate
//!                             └─ Backup → Write → Restart? → Monitor? ─┬─ Success
//!                                                                      └─ Rollback → Failed
//! ```
//!
//! # Design Decisions
//! - Nothing is touched before the remote list validates and is newer
//! - T0 is captured just before the write, truncated to whole seconds
//! - Any failure after the write rolls back; rollback is best effort and
//!   never replaces the error that triggered it
//! - The snapshot is released on every exit path

use std::fs;
use std::io;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use thiserror::Error;
use tracing::Instrument;

use crate::config::UpdateConfig;
use crate::document::{read_local_version, write_document, LocalVersion};
use crate::error::{UpdateError, UpdateResult};
use crate::health::{LogWatcher, SignalMatcher};
use crate::lifecycle::restart::Restarter;
use crate::lifecycle::snapshot::Snapshot;
use crate::source::{fetch_header_set, Fetcher};

/// Successful end states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The local document is already at or past the remote version.
    UpToDate {
        local: LocalVersion,
        remote: NaiveDateTime,
    },
    /// A new document was written and survived verification.
    Updated { version: NaiveDateTime },
}

/// Failed end state.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct UpdateFailure {
    /// The error that ended the forward path.
    #[source]
    pub error: UpdateError,

    /// Whether the document had been replaced and a rollback was attempted.
    pub rolled_back: bool,

    /// Problems hit while rolling back. Already logged.
    pub rollback_errors: Vec<UpdateError>,
}

impl UpdateFailure {
    fn aborted(error: UpdateError) -> Self {
        Self {
            error,
            rolled_back: false,
            rollback_errors: Vec::new(),
        }
    }
}

/// Coordinates one update run.
pub struct UpdateOrchestrator<F, R> {
    config: UpdateConfig,
    fetcher: F,
    restarter: R,
}

impl<F: Fetcher, R: Restarter> UpdateOrchestrator<F, R> {
    /// `config` is expected to be validated already.
    pub fn new(config: UpdateConfig, fetcher: F, restarter: R) -> Self {
        Self {
            config,
            fetcher,
            restarter,
        }
    }

    /// Run the transaction once.
    pub async fn run(&self) -> Result<UpdateOutcome, UpdateFailure> {
        let span = tracing::info_span!(
            "update",
            document = %self.config.document.path.display(),
            middleware = %self.config.document.middleware,
        );

        let result = self.execute().instrument(span.clone()).await;

        let _entered = span.enter();
        match &result {
            Ok(UpdateOutcome::UpToDate { local, .. }) => {
                tracing::info!(version = %local.timestamp(), "Already up to date");
            }
            Ok(UpdateOutcome::Updated { version }) => {
                tracing::info!(version = %version, "Update successful");
            }
            Err(failure) => {
                tracing::error!(
                    phase = %failure.error.phase(),
                    error = %failure.error,
                    rolled_back = failure.rolled_back,
                    rollback_errors = failure.rollback_errors.len(),
                    "Update failed"
                );
            }
        }
        result
    }

    async fn execute(&self) -> Result<UpdateOutcome, UpdateFailure> {
        let path = &self.config.document.path;

        self.fetcher.check_available().map_err(UpdateFailure::aborted)?;
        let remote = fetch_header_set(&self.fetcher, &self.config.source.url)
            .await
            .map_err(UpdateFailure::aborted)?;

        if path.exists() {
            let local = read_local_version(path);
            if local.is_current(remote.version()) {
                return Ok(UpdateOutcome::UpToDate {
                    local,
                    remote: remote.version(),
                });
            }
            tracing::info!(
                local = %local.timestamp(),
                remote = %remote.version(),
                "Found newer version, updating local document"
            );
        } else {
            tracing::warn!(path = %path.display(), url = %self.config.source.url, "Document not found, generating it");
        }

        let snapshot = Snapshot::take(path).map_err(UpdateFailure::aborted)?;
        let t0 = Utc::now().trunc_subsecs(0);

        if let Err(error) = write_document(
            path,
            &self.config.source.url,
            &self.config.document.middleware,
            &remote,
        ) {
            // The write goes through a temp file, so the old document is intact.
            if let Some(snapshot) = snapshot {
                snapshot.release();
            }
            return Err(UpdateFailure::aborted(error));
        }

        if let Err(error) = self.verify(t0).await {
            let rollback_errors = self.rollback(snapshot.as_ref()).await;
            if let Some(snapshot) = snapshot {
                snapshot.release();
            }
            return Err(UpdateFailure {
                error,
                rolled_back: true,
                rollback_errors,
            });
        }

        if let Some(snapshot) = snapshot {
            snapshot.release();
        }
        Ok(UpdateOutcome::Updated {
            version: remote.version(),
        })
    }

    /// Restart if configured, then watch the proxy log if one is configured.
    async fn verify(&self, t0: chrono::DateTime<Utc>) -> UpdateResult<()> {
        if self.config.restart.enabled {
            self.restarter.restart().await?;
        }

        let Some(log) = &self.config.monitor.log_path else {
            tracing::debug!("No proxy log configured, skipping monitoring");
            return Ok(());
        };

        let mut targets = vec![self.config.document.middleware.clone()];
        if let Some(name) = self.config.document.path.file_name() {
            targets.push(name.to_string_lossy().into_owned());
        }
        let matcher = SignalMatcher::new(t0, self.config.monitor.error_marker.clone(), targets);

        LogWatcher::new(log, matcher)
            .with_poll_interval(self.config.monitor.poll_interval())
            .watch(self.config.monitor.window())
            .await
    }

    /// Restore the pre-update state. Every step runs even if an earlier one failed.
    async fn rollback(&self, snapshot: Option<&Snapshot>) -> Vec<UpdateError> {
        let path = &self.config.document.path;
        let mut errors = Vec::new();

        tracing::warn!(path = %path.display(), "Rolling back");

        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => errors.push(UpdateError::Rollback(format!(
                "could not remove {}: {}",
                path.display(),
                e
            ))),
        }

        if let Some(snapshot) = snapshot {
            if let Err(e) = snapshot.restore() {
                errors.push(UpdateError::Rollback(format!(
                    "could not restore {} from {}: {}",
                    path.display(),
                    snapshot.location().display(),
                    e
                )));
            }
        }

        if self.config.restart.enabled {
            if let Err(e) = self.restarter.restart().await {
                errors.push(UpdateError::Rollback(format!("restart after restore failed: {}", e)));
            }
        }

        for error in &errors {
            tracing::error!(error = %error, "Rollback step failed");
        }
        if errors.is_empty() {
            tracing::info!("Rollback complete");
        }
        errors
    }
}
