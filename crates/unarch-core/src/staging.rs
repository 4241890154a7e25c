//! Staging area: the intermediate decode target for one extraction.
//!
//! Entries are decoded once into this directory and then fanned out to
//! their final destinations with plain file copies, so an entry mapped to
//! many outputs is never decoded more than once.

use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::ErrorKind;
use crate::Result;

/// A process-unique temporary directory holding decoded entries.
///
/// Created fresh for every `extract` call and removed when dropped, which
/// covers success, failure, and early-return paths alike. Only a hard
/// process kill can leave one behind.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Creates a new unique staging directory under the system temp root.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::OutOfMemory`] when the directory cannot be
    /// created; staging-area creation failures are classified as resource
    /// exhaustion.
    pub fn new() -> Result<Self> {
        let dir = TempDir::with_prefix("unarch-staging-")
            .map_err(|e| ErrorKind::OutOfMemory(e.to_string()))?;
        Ok(Self { dir })
    }

    /// Root of the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where a decoded entry lives inside the staging area, keyed by its
    /// archive-relative path.
    #[must_use]
    pub fn staged_path(&self, archive_path: &Path) -> PathBuf {
        self.dir.path().join(archive_path)
    }
}
