//! Passive health checking of the proxy after an update.
//!
//! # Responsibilities
//! - Tail the proxy log for a bounded window
//! - Assemble multi-line records and match regression signals
//! - Stop at the first signal or at the deadline, whichever comes first
//!
//! # Design Decisions
//! - Explicit deadline-driven poll, never an open-ended read
//! - Zero window means exactly one pass over what is already there
//! - Incremental: each pass reads only bytes appended since the last one
//! - A shrunken file is treated as rotated and re-read from the start
//! - Reads in fixed-size chunks; only the unterminated tail line is buffered

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, Instant};

use crate::error::{UpdateError, UpdateResult};
use crate::health::record::{LogRecord, RecordAssembler, SignalMatcher};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Bytes pulled from the log per read.
const READ_CHUNK: usize = 64 * 1024;

/// Watches one log file for records attributable to a change made at `since`.
#[derive(Debug, Clone)]
pub struct LogWatcher {
    path: PathBuf,
    matcher: SignalMatcher,
    poll_interval: Duration,
}

/// Read position carried between passes.
#[derive(Debug, Default)]
struct Tail {
    offset: u64,
    partial: Vec<u8>,
    records: RecordAssembler,
}

impl Tail {
    fn reset(&mut self) {
        self.offset = 0;
        self.partial.clear();
        self.records.reset();
    }
}

impl LogWatcher {
    pub fn new(path: impl Into<PathBuf>, matcher: SignalMatcher) -> Self {
        Self {
            path: path.into(),
            matcher,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Watch until `since + window` on the wall clock.
    ///
    /// Fails with `DetectedRegression` as soon as a signal is seen.
    pub async fn watch(&self, window: Duration) -> UpdateResult<()> {
        let deadline = Instant::now() + self.remaining(window);
        let mut tail = Tail::default();
        let mut passes = 0u32;

        tracing::info!(
            log = %self.path.display(),
            window_secs = window.as_secs(),
            since = %self.matcher.since(),
            "Watching proxy log for regressions"
        );

        loop {
            let last = Instant::now() >= deadline;
            passes += 1;

            if let Some(record) = self.scan(&mut tail, last)? {
                tracing::warn!(
                    log = %self.path.display(),
                    at = %record.at,
                    record = %record.text,
                    "Regression signal in proxy log"
                );
                return Err(UpdateError::DetectedRegression {
                    log: self.path.clone(),
                    at: record.at,
                    record: record.text,
                });
            }

            if last {
                break;
            }
            let now = Instant::now();
            sleep(self.poll_interval.min(deadline.saturating_duration_since(now))).await;
        }

        tracing::info!(log = %self.path.display(), passes, "No regression detected");
        Ok(())
    }

    /// Time left until `since + window`, zero if already past.
    fn remaining(&self, window: Duration) -> Duration {
        let elapsed = (Utc::now() - self.matcher.since())
            .to_std()
            .unwrap_or(Duration::ZERO);
        window.saturating_sub(elapsed)
    }

    /// One pass over newly appended bytes. Returns the first signal found.
    fn scan(&self, tail: &mut Tail, last: bool) -> UpdateResult<Option<LogRecord>> {
        let monitor = |source| UpdateError::Monitor {
            path: self.path.clone(),
            source,
        };

        let Some(mut file) = self.open_at_offset(tail).map_err(monitor)? else {
            return Ok(None);
        };

        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let read = file.read(&mut chunk).map_err(monitor)?;
            if read == 0 {
                break;
            }
            tail.offset += read as u64;
            tail.partial.extend_from_slice(&chunk[..read]);
            if let Some(record) = self.consume_lines(tail) {
                return Ok(Some(record));
            }
        }

        if last && !tail.partial.is_empty() {
            let line = std::mem::take(&mut tail.partial);
            let line = String::from_utf8_lossy(&line);
            if let Some(done) = tail.records.push_line(line.trim_end_matches('\r')) {
                if self.matcher.is_signal(&done) {
                    return Ok(Some(done));
                }
            }
        }

        // The open record may still grow; a match now is already conclusive.
        Ok(tail
            .records
            .current()
            .filter(|record| self.matcher.is_signal(record))
            .cloned())
    }

    /// Feed every complete line in the buffer to the assembler, keeping the
    /// unterminated remainder.
    fn consume_lines(&self, tail: &mut Tail) -> Option<LogRecord> {
        let mut start = 0;
        let mut found = None;

        while let Some(pos) = tail.partial[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            let line = String::from_utf8_lossy(&tail.partial[start..end]);
            let done = tail.records.push_line(line.trim_end_matches('\r'));
            start = end + 1;

            if let Some(record) = done.filter(|record| self.matcher.is_signal(record)) {
                found = Some(record);
                break;
            }
        }

        tail.partial.drain(..start);
        found
    }

    /// Open the log positioned after the bytes already consumed.
    ///
    /// `None` when the file is missing.
    fn open_at_offset(&self, tail: &mut Tail) -> io::Result<Option<File>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(log = %self.path.display(), "Proxy log missing, waiting for it to reappear");
                tail.reset();
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let len = file.metadata()?.len();
        if len < tail.offset {
            tracing::debug!(log = %self.path.display(), "Proxy log shrank, rereading from start");
            tail.reset();
        }

        file.seek(SeekFrom::Start(tail.offset))?;
        Ok(Some(file))
    }
}
