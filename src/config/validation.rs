//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referenced paths exist before anything is touched
//! - Reject blank commands and identifiers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: UpdateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::config::schema::UpdateConfig;

/// Extensions the proxy's file provider loads as YAML.
const DOCUMENT_EXTENSIONS: &[&str] = &["yaml", "yml"];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("source.url '{url}' is not an http(s) URL: {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("document.path '{}' has no parent directory on disk", .0.display())]
    MissingParent(PathBuf),

    #[error("document.path '{}' must end in .yaml or .yml", .0.display())]
    UnsupportedExtension(PathBuf),

    #[error("monitor.log_path '{}' is not an existing file", .0.display())]
    MissingLog(PathBuf),

    #[error("monitor.poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error("logging.level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLevel(String),

    #[error("logging.file '{}' has no parent directory on disk", .0.display())]
    MissingLogFileParent(PathBuf),
}

/// Validate a resolved configuration, collecting every problem.
pub fn validate_config(config: &UpdateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.source.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidSourceUrl {
            url: config.source.url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidSourceUrl {
            url: config.source.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.source.fetch_command.trim().is_empty() {
        errors.push(ValidationError::Blank { field: "source.fetch_command" });
    }

    let path = &config.document.path;
    if !parent_exists(path) {
        errors.push(ValidationError::MissingParent(path.clone()));
    }
    let known_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext));
    if !known_extension {
        errors.push(ValidationError::UnsupportedExtension(path.clone()));
    }

    if config.document.middleware.trim().is_empty() {
        errors.push(ValidationError::Blank { field: "document.middleware" });
    }
    if config.restart.command.trim().is_empty() {
        errors.push(ValidationError::Blank { field: "restart.command" });
    }

    if let Some(log) = &config.monitor.log_path {
        if !log.is_file() {
            errors.push(ValidationError::MissingLog(log.clone()));
        }
    }
    if config.monitor.error_marker.trim().is_empty() {
        errors.push(ValidationError::Blank { field: "monitor.error_marker" });
    }
    if config.monitor.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLevel(config.logging.level.clone()));
    }
    if let Some(file) = &config.logging.file {
        if !parent_exists(file) {
            errors.push(ValidationError::MissingLogFileParent(file.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A bare file name lives in the current directory.
fn parent_exists(path: &Path) -> bool {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => true,
        Some(parent) => parent.is_dir(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> UpdateConfig {
        let mut config = UpdateConfig::default();
        config.document.path = dir.join("headers.yaml");
        config
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&UpdateConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.document.middleware = "   ".into();
        config.restart.command = String::new();
        config.logging.level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Blank { field: "document.middleware" }));
        assert!(errors.contains(&ValidationError::Blank { field: "restart.command" }));
        assert!(errors.contains(&ValidationError::UnknownLevel("loud".into())));
    }

    #[test]
    fn test_document_path_rules() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = config_in(dir.path());
        config.document.path = dir.path().join("missing").join("headers.yaml");
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::MissingParent(_)));

        config.document.path = dir.path().join("headers.json");
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UnsupportedExtension(_)));

        config.document.path = dir.path().join("headers.yml");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_monitor_log_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.monitor.log_path = Some(dir.path().join("traefik.log"));
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::MissingLog(_)));

        std::fs::write(dir.path().join("traefik.log"), "").unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_source_url_scheme() {
        let mut config = UpdateConfig::default();
        config.source.url = "ftp://example.com/headers.json".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidSourceUrl { .. }));

        config.source.url = "not a url".into();
        assert!(validate_config(&config).is_err());
    }
}
