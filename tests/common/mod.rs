//! Shared stubs and fixtures for transaction tests.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use header_strip_sync::config::UpdateConfig;
use header_strip_sync::error::{UpdateError, UpdateResult};
use header_strip_sync::lifecycle::Restarter;
use header_strip_sync::source::Fetcher;

pub const SOURCE_URL: &str = "https://example.test/headers_remove.json";

pub fn body(version: &str, headers: &[&str]) -> Vec<u8> {
    serde_json::json!({ "last_update_utc": version, "headers": headers })
        .to_string()
        .into_bytes()
}

/// Serves a fixed body (or failure) and counts fetches.
pub struct StubFetcher {
    available: bool,
    body: Option<Vec<u8>>,
    pub fetches: AtomicUsize,
}

impl StubFetcher {
    pub fn serving(body: Vec<u8>) -> Self {
        Self {
            available: true,
            body: Some(body),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            available: true,
            body: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            available: false,
            body: None,
            fetches: AtomicUsize::new(0),
        }
    }
}

impl Fetcher for StubFetcher {
    fn check_available(&self) -> UpdateResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(UpdateError::ToolUnavailable {
                tool: "stub".into(),
                reason: "not installed".into(),
            })
        }
    }

    async fn fetch(&self, url: &str) -> UpdateResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.body.clone().ok_or_else(|| UpdateError::Fetch {
            url: url.to_string(),
            reason: "exit status: 22".into(),
        })
    }
}

/// Records restarts; optionally fails the first one or logs a line like a proxy would.
#[derive(Default)]
pub struct StubRestarter {
    pub calls: AtomicUsize,
    fail_first: bool,
    log_on_start: Mutex<Option<(PathBuf, String)>>,
}

impl StubRestarter {
    pub fn failing_first() -> Self {
        Self {
            fail_first: true,
            ..Default::default()
        }
    }

    /// On every restart, append `<now> <message>` to `log`.
    pub fn logging(log: &Path, message: &str) -> Self {
        Self {
            log_on_start: Mutex::new(Some((log.to_path_buf(), message.to_string()))),
            ..Default::default()
        }
    }
}

impl Restarter for StubRestarter {
    async fn restart(&self) -> UpdateResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first && call == 0 {
            return Err(UpdateError::Restart {
                command: "stub restart".into(),
                reason: "exit status: 1".into(),
            });
        }
        let target = self.log_on_start.lock().unwrap().clone();
        if let Some((log, message)) = target {
            append_log(&log, &message);
        }
        Ok(())
    }
}

pub fn append_log(log: &Path, message: &str) {
    let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut file = fs::OpenOptions::new().create(true).append(true).open(log).unwrap();
    writeln!(file, "{} {}", stamp, message).unwrap();
}

/// Config rooted in `dir`, with fast polling and a short window.
pub fn config_in(dir: &Path) -> UpdateConfig {
    let mut config = UpdateConfig::default();
    config.source.url = SOURCE_URL.to_string();
    config.document.path = dir.join("middleware_owasp_headers_remove.yaml");
    config.document.middleware = "owasp_headers_remove".to_string();
    config.monitor.window_secs = 1;
    config.monitor.poll_interval_ms = 20;
    config
}

pub const OLD_DOCUMENT: &str = "\
# DO NOT MODIFY. THIS FILE IS GENERATED FROM https://example.test/headers_remove.json
# Updated on: 2024-01-01 00:00:00
http:
  middlewares:
    owasp_headers_remove:
      headers:
        customResponseHeaders:
          Server: \"\"
";
