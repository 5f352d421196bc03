//! Structured logging.
//!
//! # Responsibilities
//! - Build the subscriber for one run: console plus optional file copy
//! - Apply the configured level unless `RUST_LOG` overrides it
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Installed as the scoped default, released when the guard drops
//! - File output is appended and never colored

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// Why the configured logging could not be installed.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log level '{0}'")]
    Level(String),

    #[error("cannot open log file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Keeps the run's subscriber installed until dropped.
pub struct LoggingGuard {
    _default: DefaultGuard,
}

/// Install logging for the current run.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| LoggingError::Level(config.level.clone()))?;

    let file_layer = match &config.file {
        Some(path) => {
            let file = open_append(path).map_err(|source| LoggingError::File {
                path: path.clone(),
                source,
            })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(env_filter(level))
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer);

    Ok(LoggingGuard {
        _default: tracing::subscriber::set_default(subscriber),
    })
}

/// Console-only logging at `info`, for reporting problems with the
/// configuration itself.
pub fn init_console() -> LoggingGuard {
    let subscriber = Registry::default()
        .with(env_filter(Level::INFO))
        .with(fmt::layer().with_writer(io::stderr));

    LoggingGuard {
        _default: tracing::subscriber::set_default(subscriber),
    }
}

/// `RUST_LOG` wins when set; otherwise everything at `level` and above.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
