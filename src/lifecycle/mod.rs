//! Update lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Transaction (transaction.rs):
//!     Fetch → Decide → Snapshot → Write → Restart → Monitor → Commit | Rollback
//!
//! Snapshot (snapshot.rs):
//!     Copy of the old document in a private temp dir, released at the end
//!
//! Restart (restart.rs):
//!     External command, run forward and again on rollback
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: each phase blocks the run until it completes
//! - Fail fast before the write, roll back after it
//! - Rollback failures are logged and reported, never raised over the trigger

pub mod restart;
pub mod snapshot;
pub mod transaction;

pub use restart::{CommandRestarter, Restarter};
pub use snapshot::Snapshot;
pub use transaction::{UpdateFailure, UpdateOrchestrator, UpdateOutcome};
