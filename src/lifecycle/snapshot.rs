//! Backup snapshot of the pre-update document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{UpdateError, UpdateResult};

/// Copy of the document taken just before it is overwritten.
///
/// Lives in a private temporary directory that is removed when the snapshot
/// is released or dropped, so it never outlives one run.
#[derive(Debug)]
pub struct Snapshot {
    dir: TempDir,
    copy: PathBuf,
    original: PathBuf,
}

impl Snapshot {
    /// Snapshot `path`, or `None` if there is nothing to protect yet.
    pub fn take(path: &Path) -> UpdateResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let fail = |source| UpdateError::Snapshot {
            path: path.to_path_buf(),
            source,
        };
        let dir = tempfile::Builder::new()
            .prefix("header-strip-sync-")
            .tempdir()
            .map_err(fail)?;
        let name = path.file_name().unwrap_or(path.as_os_str());
        let copy = dir.path().join(name);
        fs::copy(path, &copy).map_err(fail)?;

        tracing::debug!(path = %path.display(), snapshot = %copy.display(), "Snapshot taken");
        Ok(Some(Self {
            dir,
            copy,
            original: path.to_path_buf(),
        }))
    }

    pub fn location(&self) -> &Path {
        &self.copy
    }

    /// Put the saved bytes back at the original path.
    pub fn restore(&self) -> io::Result<()> {
        fs::copy(&self.copy, &self.original)?;
        tracing::info!(path = %self.original.display(), "Previous document restored");
        Ok(())
    }

    /// Delete the holding directory.
    pub fn release(self) {
        let dir = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(snapshot = %dir.display(), error = %e, "Could not remove snapshot directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_document() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Snapshot::take(&dir.path().join("none.yaml")).unwrap().is_none());
    }

    #[test]
    fn test_restore_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yaml");
        fs::write(&path, "before\n").unwrap();

        let snapshot = Snapshot::take(&path).unwrap().unwrap();
        let holding = snapshot.location().parent().unwrap().to_path_buf();
        assert_eq!(fs::read_to_string(snapshot.location()).unwrap(), "before\n");

        fs::remove_file(&path).unwrap();
        snapshot.restore().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "before\n");

        snapshot.release();
        assert!(!holding.exists());
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yaml");
        fs::write(&path, "x").unwrap();

        let holding = {
            let snapshot = Snapshot::take(&path).unwrap().unwrap();
            snapshot.location().parent().unwrap().to_path_buf()
        };
        assert!(!holding.exists());
    }
}
