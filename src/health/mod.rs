//! Post-update health checking.
//!
//! # Data Flow
//! ```text
//! Passive log watch (passive.rs):
//!     proxy log bytes appended since last pass
//!     → record.rs (group lines into timestamped records)
//!     → SignalMatcher (at/after T0 + error marker + our middleware)
//!     → DetectedRegression or quiet deadline
//! ```
//!
//! # Design Decisions
//! - Only records at or after the write are attributable to it
//! - The deadline is mandatory; a zero window samples once

pub mod passive;
pub mod record;

pub use passive::LogWatcher;
pub use record::{record_timestamp, LogRecord, RecordAssembler, SignalMatcher};
