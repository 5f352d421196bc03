//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for one update run.
//! All types derive Serde traits for deserialization from an optional TOML file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upstream reference list published by the OWASP Secure Headers Project.
pub const DEFAULT_SOURCE_URL: &str =
    "https://owasp.org/www-project-secure-headers/ci/headers_remove.json";

/// Root configuration for the updater.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpdateConfig {
    /// Where the reference list comes from and how it is fetched.
    pub source: SourceConfig,

    /// The generated middleware document.
    pub document: DocumentConfig,

    /// Restart of the dependent proxy after a write.
    pub restart: RestartConfig,

    /// Post-update log monitoring.
    pub monitor: MonitorConfig,

    /// Our own log output.
    pub logging: LoggingConfig,
}

/// Remote source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL of the JSON reference list.
    pub url: String,

    /// Fetch program and its fixed arguments; the URL is appended.
    pub fetch_command: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            fetch_command: "curl -s -f -L".to_string(),
        }
    }
}

/// Generated document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path of the dynamic configuration file the proxy loads.
    pub path: PathBuf,

    /// Middleware name the header list is published under.
    pub middleware: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("middleware_owasp_headers_remove.yaml"),
            middleware: "owasp_headers_remove".to_string(),
        }
    }
}

/// Restart configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Restart the proxy after writing a new document.
    pub enabled: bool,

    /// Command line, split on whitespace.
    pub command: String,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "systemctl restart traefik".to_string(),
        }
    }
}

/// Log monitoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds to watch the proxy log after the write (0 = single pass).
    pub window_secs: u64,

    /// Proxy log file. Monitoring is skipped when unset.
    pub log_path: Option<PathBuf>,

    /// Substring marking an error record.
    pub error_marker: String,

    /// Delay between scans of the log file, in milliseconds.
    pub poll_interval_ms: u64,
}

impl MonitorConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_secs: 10,
            log_path: None,
            error_marker: "ERR".to_string(),
            poll_interval_ms: 500,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (trace, debug, info, warn, error).
    pub level: String,

    /// Optional file receiving a copy of every log line.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
