//! Configuration loading from disk and the command line.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::schema::UpdateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Command-line overrides. Every flag wins over the file and the defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// URL of the reference header list
    #[arg(long)]
    pub url: Option<String>,

    /// Fetch program and arguments (the URL is appended)
    #[arg(long)]
    pub fetch_command: Option<String>,

    /// Generated middleware file
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Middleware name inside the generated file
    #[arg(short, long)]
    pub middleware: Option<String>,

    /// Restart the proxy after writing
    #[arg(short, long)]
    pub restart: bool,

    /// Command used to restart the proxy
    #[arg(long)]
    pub restart_command: Option<String>,

    /// Seconds to watch the proxy log after an update (0 = single pass)
    #[arg(short, long)]
    pub wait_secs: Option<u64>,

    /// Proxy log file to watch for errors
    #[arg(long)]
    pub proxy_log: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Also write our log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Overrides {
    /// Layer the flags that were given onto `config`.
    pub fn apply(self, config: &mut UpdateConfig) {
        if let Some(url) = self.url {
            config.source.url = url;
        }
        if let Some(command) = self.fetch_command {
            config.source.fetch_command = command;
        }
        if let Some(path) = self.path {
            config.document.path = path;
        }
        if let Some(middleware) = self.middleware {
            config.document.middleware = middleware;
        }
        if self.restart {
            config.restart.enabled = true;
        }
        if let Some(command) = self.restart_command {
            config.restart.command = command;
        }
        if let Some(secs) = self.wait_secs {
            config.monitor.window_secs = secs;
        }
        if let Some(log) = self.proxy_log {
            config.monitor.log_path = Some(log);
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(file) = self.log_file {
            config.logging.file = Some(file);
        }
    }
}

/// Read configuration from a TOML file, or start from defaults.
///
/// The result is not validated yet; overrides still have to be applied.
pub fn load_config(path: Option<&Path>) -> Result<UpdateConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(UpdateConfig::default());
    };
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load, override, and validate in one step.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<UpdateConfig, ConfigError> {
    let mut config = load_config(path)?;
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
