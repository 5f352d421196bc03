//! Recovery of the last applied version from the deployed document.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::source::parse_timestamp;

/// Comment prefix carrying the version stamp.
pub const VERSION_MARKER: &str = "# Updated on: ";

/// Version embedded in the local document, or the Unix epoch if unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalVersion(NaiveDateTime);

impl LocalVersion {
    /// Sentinel that every real version compares newer than.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH.naive_utc())
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.0
    }

    pub fn is_epoch(&self) -> bool {
        *self == Self::epoch()
    }

    /// True when the local document is at least as new as `remote`.
    pub fn is_current(&self, remote: NaiveDateTime) -> bool {
        self.0 >= remote
    }
}

impl From<NaiveDateTime> for LocalVersion {
    fn from(ts: NaiveDateTime) -> Self {
        Self(ts)
    }
}

/// Read the version stamp from `path`.
///
/// Never fails: a missing file, a missing stamp, or an unparsable stamp all
/// yield [`LocalVersion::epoch`] after logging why.
pub fn read_local_version(path: &Path) -> LocalVersion {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No local document yet");
            return LocalVersion::epoch();
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Could not open local document");
            return LocalVersion::epoch();
        }
    };

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Could not read local document");
                return LocalVersion::epoch();
            }
        };

        if let Some(stamp) = line.strip_prefix(VERSION_MARKER) {
            return match parse_timestamp(stamp) {
                Some(ts) => LocalVersion(ts),
                None => {
                    tracing::error!(path = %path.display(), stamp = %stamp.trim(), "Could not parse last update timestamp");
                    LocalVersion::epoch()
                }
            };
        }
    }

    tracing::error!(path = %path.display(), "Could not find last update timestamp");
    LocalVersion::epoch()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reads_first_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yaml");
        fs::write(
            &path,
            "# DO NOT MODIFY.\n# Updated on: 2025-07-06 23:15:30\n# Updated on: 2030-01-01 00:00:00\nhttp:\n",
        )
        .unwrap();

        let version = read_local_version(&path);
        assert_eq!(version.timestamp().to_string(), "2025-07-06 23:15:30");
        assert!(!version.is_epoch());
    }

    #[test]
    fn test_missing_file_is_epoch() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_local_version(&dir.path().join("absent.yaml")).is_epoch());
    }

    #[test]
    fn test_unusable_stamp_is_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yaml");

        fs::write(&path, "http:\n  middlewares: {}\n").unwrap();
        assert!(read_local_version(&path).is_epoch());

        fs::write(&path, "# Updated on: yesterday\n# Updated on: 2025-01-01 00:00:00\n").unwrap();
        assert!(read_local_version(&path).is_epoch());
    }

    #[test]
    fn test_comparison() {
        let remote = parse_timestamp("2025-01-01 00:00:00").unwrap();
        assert!(!LocalVersion::epoch().is_current(remote));
        assert!(LocalVersion::from(remote).is_current(remote));
        let newer = parse_timestamp("2025-01-01 00:00:01").unwrap();
        assert!(LocalVersion::from(newer).is_current(remote));
    }
}
