//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → inside the per-run `update` span
//!
//! Consumers:
//!     → stderr (always)
//!     → append-only log file (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (path, phase, error) for grep-able terminal lines
//! - Subscriber lifetime is one run, owned by the caller
//! - Configuration problems are reported on the console at `info`, before
//!   the configured sinks exist

pub mod logging;

pub use logging::{init as init_logging, init_console, LoggingError, LoggingGuard};
