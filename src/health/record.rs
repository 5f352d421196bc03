//! Multi-line log record assembly and regression matching.

use chrono::{DateTime, NaiveDateTime, Utc};

/// One log entry: a timestamped first line plus any continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Timestamp at the start of `line`, if it opens a new record.
///
/// The first whitespace-delimited field must be ISO-8601: RFC 3339 with an
/// offset, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` read as UTC.
pub fn record_timestamp(line: &str) -> Option<DateTime<Utc>> {
    let field = line.split_whitespace().next()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(field) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(field, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Groups lines into records as they arrive.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    current: Option<LogRecord>,
}

impl RecordAssembler {
    /// Feed one line. Returns the previous record once a new one starts.
    ///
    /// Lines before the first timestamped line belong to no record and are dropped.
    pub fn push_line(&mut self, line: &str) -> Option<LogRecord> {
        match record_timestamp(line) {
            Some(at) => self.current.replace(LogRecord {
                at,
                text: line.to_string(),
            }),
            None => {
                if let Some(record) = self.current.as_mut() {
                    record.text.push('\n');
                    record.text.push_str(line);
                }
                None
            }
        }
    }

    /// The record still open to continuation lines.
    pub fn current(&self) -> Option<&LogRecord> {
        self.current.as_ref()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Decides whether a record is attributable to the update.
#[derive(Debug, Clone)]
pub struct SignalMatcher {
    since: DateTime<Utc>,
    marker: String,
    targets: Vec<String>,
}

impl SignalMatcher {
    /// `targets` are alternatives: any one appearing in the record matches.
    pub fn new(since: DateTime<Utc>, marker: impl Into<String>, targets: Vec<String>) -> Self {
        Self {
            since,
            marker: marker.into(),
            targets,
        }
    }

    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn is_signal(&self, record: &LogRecord) -> bool {
        record.at >= self.since
            && record.text.contains(&self.marker)
            && self.targets.iter().any(|t| record.text.contains(t.as_str()))
    }
}
