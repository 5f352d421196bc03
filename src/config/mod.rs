//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → command-line overrides (loader.rs)
//!     → validation.rs (semantic checks, every problem reported)
//!     → UpdateConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is resolved once per run and never changes afterwards
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError, Overrides};
pub use schema::{
    DocumentConfig, LoggingConfig, MonitorConfig, RestartConfig, SourceConfig, UpdateConfig,
};
