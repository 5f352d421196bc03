//! Keeps a reverse proxy's "strip response headers" middleware in sync with an
//! upstream reference list, without ever leaving a broken document in place.

pub mod config;
pub mod document;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod source;

pub use config::UpdateConfig;
pub use error::{Phase, UpdateError};
pub use lifecycle::{UpdateFailure, UpdateOrchestrator, UpdateOutcome};
pub use source::HeaderSet;
