//! Remote reference source.
//!
//! # Data Flow
//! ```text
//! fetcher.rs (external command → raw bytes)
//!     → header_set.rs (JSON validation)
//!     → HeaderSet (immutable, handed to the transaction)
//! ```

pub mod fetcher;
pub mod header_set;

pub use fetcher::{CommandFetcher, Fetcher};
pub use header_set::{parse_timestamp, HeaderSet, TIMESTAMP_FORMAT};

use crate::error::UpdateResult;

/// Fetch `url` and validate the body into a `HeaderSet`.
pub async fn fetch_header_set<F: Fetcher>(fetcher: &F, url: &str) -> UpdateResult<HeaderSet> {
    let body = fetcher.fetch(url).await?;
    let set = HeaderSet::from_json(&body)?;
    tracing::info!(
        version = %set.version(),
        headers = set.headers().len(),
        "Remote header list validated"
    );
    Ok(set)
}
