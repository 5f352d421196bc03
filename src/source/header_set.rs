//! Validated reference header list.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::{UpdateError, UpdateResult};

/// Timestamp layout used by the remote list and the generated document.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wire shape of the remote body. Both fields may be absent or null.
#[derive(Debug, Deserialize)]
struct RawHeaderSet {
    last_update_utc: Option<String>,
    headers: Option<Vec<String>>,
}

/// Header names to strip, stamped with the upstream update time (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    version: NaiveDateTime,
    headers: Vec<String>,
}

impl HeaderSet {
    /// Validate a fetched body.
    ///
    /// Header order is preserved and duplicates are passed through.
    pub fn from_json(body: &[u8]) -> UpdateResult<Self> {
        let raw: RawHeaderSet = serde_json::from_slice(body)
            .map_err(|e| UpdateError::Validation(format!("malformed body: {}", e)))?;

        let stamp = raw
            .last_update_utc
            .ok_or_else(|| UpdateError::Validation("could not find \"last_update_utc\"".into()))?;
        let version = parse_timestamp(&stamp).ok_or_else(|| {
            UpdateError::Validation(format!(
                "\"last_update_utc\" value '{}' does not match YYYY-MM-DD HH:MM:SS",
                stamp
            ))
        })?;

        let headers = raw
            .headers
            .ok_or_else(|| UpdateError::Validation("could not find \"headers\"".into()))?;
        if headers.is_empty() {
            return Err(UpdateError::Validation("\"headers\" is empty".into()));
        }

        Ok(Self { version, headers })
    }

    /// Build directly from trusted parts.
    pub fn new(version: NaiveDateTime, headers: Vec<String>) -> Self {
        Self { version, headers }
    }

    pub fn version(&self) -> NaiveDateTime {
        self.version
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

/// Parse a `YYYY-MM-DD HH:MM:SS` stamp, ignoring surrounding whitespace.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}
