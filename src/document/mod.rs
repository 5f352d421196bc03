//! The generated middleware document.
//!
//! # Data Flow
//! ```text
//! existing file → version.rs → LocalVersion (compared against remote)
//! HeaderSet     → writer.rs  → file on disk (read by the proxy's file provider)
//! ```

pub mod version;
pub mod writer;

pub use version::{read_local_version, LocalVersion, VERSION_MARKER};
pub use writer::{render_document, write_document};
