//! Restart of the dependent proxy process.
//!
//! # Responsibilities
//! - Run the configured restart command line
//! - Treat spawn failure and non-zero exit alike as `Restart` errors
//!
//! # Design Decisions
//! - Command line is split on whitespace; no shell is involved
//! - `Restarter` is a trait so tests can inject failures

use std::future::Future;

use tokio::process::Command;

use crate::error::{UpdateError, UpdateResult};

/// Something that restarts the proxy.
pub trait Restarter {
    fn restart(&self) -> impl Future<Output = UpdateResult<()>> + Send;
}

impl<T: Restarter + Sync> Restarter for &T {
    fn restart(&self) -> impl Future<Output = UpdateResult<()>> + Send {
        (**self).restart()
    }
}

/// Restarts by running a command such as `systemctl restart traefik`.
#[derive(Debug, Clone)]
pub struct CommandRestarter {
    command: String,
}

impl CommandRestarter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn fail(&self, reason: String) -> UpdateError {
        UpdateError::Restart {
            command: self.command.clone(),
            reason,
        }
    }
}

impl Restarter for CommandRestarter {
    async fn restart(&self) -> UpdateResult<()> {
        let mut words = self.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| self.fail("empty command".into()))?;

        tracing::info!(command = %self.command, "Restarting proxy");

        let output = Command::new(program)
            .args(words)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.fail(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.fail(format!("{} ({})", output.status, stderr.trim())));
        }

        tracing::debug!(command = %self.command, "Restart command finished");
        Ok(())
    }
}
