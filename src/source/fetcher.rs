//! Remote fetch through an external command.
//!
//! # Responsibilities
//! - Locate the fetch program before any request is made
//! - Run it with the URL appended and capture stdout
//! - Map spawn failures, non-zero exits and empty bodies to `Fetch`
//!
//! # Design Decisions
//! - No HTTP client in-process; the host's fetch tool handles proxies and TLS
//! - `Fetcher` is a trait so the transaction can be driven by a stub in tests

use std::future::Future;
use std::path::PathBuf;

use tokio::process::Command;

use crate::error::{UpdateError, UpdateResult};

/// Something that can retrieve raw bytes for a URL.
pub trait Fetcher {
    /// Fail fast if the fetch mechanism is missing.
    fn check_available(&self) -> UpdateResult<()>;

    /// Retrieve the body at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = UpdateResult<Vec<u8>>> + Send;
}

impl<T: Fetcher + Sync> Fetcher for &T {
    fn check_available(&self) -> UpdateResult<()> {
        (**self).check_available()
    }

    fn fetch(&self, url: &str) -> impl Future<Output = UpdateResult<Vec<u8>>> + Send {
        (**self).fetch(url)
    }
}

/// Fetches by running a program such as `curl -s -f -L <url>`.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
}

impl CommandFetcher {
    /// Split a command line on whitespace. The first word is the program.
    pub fn from_command_line(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();
        Self {
            program,
            args: words.collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn locate(&self) -> UpdateResult<PathBuf> {
        which::which(&self.program).map_err(|e| UpdateError::ToolUnavailable {
            tool: self.program.clone(),
            reason: e.to_string(),
        })
    }
}

impl Fetcher for CommandFetcher {
    fn check_available(&self) -> UpdateResult<()> {
        let resolved = self.locate()?;
        tracing::debug!(tool = %self.program, path = %resolved.display(), "Fetch tool located");
        Ok(())
    }

    async fn fetch(&self, url: &str) -> UpdateResult<Vec<u8>> {
        let fail = |reason: String| UpdateError::Fetch {
            url: url.to_string(),
            reason,
        };

        tracing::debug!(tool = %self.program, args = ?self.args, url = %url, "Fetching reference list");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| fail(format!("could not run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("{} ({})", output.status, stderr.trim())));
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(fail("empty response body".into()));
        }

        tracing::debug!(bytes = output.stdout.len(), "Reference list fetched");
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_split() {
        let fetcher = CommandFetcher::from_command_line("  curl -s  -f -L ");
        assert_eq!(fetcher.program(), "curl");
        assert_eq!(fetcher.args, ["-s", "-f", "-L"]);
    }

    #[test]
    fn test_missing_tool() {
        let fetcher = CommandFetcher::from_command_line("definitely-not-a-fetch-tool-4f1c");
        assert!(matches!(
            fetcher.check_available(),
            Err(UpdateError::ToolUnavailable { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_body() {
        // `echo <url>` stands in for a real fetch tool.
        let fetcher = CommandFetcher::from_command_line("echo");
        fetcher.check_available().unwrap();
        let body = fetcher.fetch("payload").await.unwrap();
        assert_eq!(body, b"payload\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failures() {
        let fetcher = CommandFetcher::from_command_line("false");
        assert!(matches!(fetcher.fetch("x").await, Err(UpdateError::Fetch { .. })));

        let fetcher = CommandFetcher::from_command_line("true");
        let err = fetcher.fetch("x").await.unwrap_err();
        assert!(err.to_string().contains("empty response body"));
    }
}
