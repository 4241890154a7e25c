//! The entry catalog: per-entry metadata plus caller-assigned output paths.

use std::path::Path;
use std::path::PathBuf;

/// Kind of a catalog entry, with kind-specific metadata.
///
/// Directories carry no size or checksum; keeping the metadata inside the
/// variant makes extraction an exhaustive match instead of flag checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with its uncompressed size and the CRC recorded in the
    /// archive index (0 when the format stores none, e.g. tar).
    File {
        /// Uncompressed size in bytes.
        size: u64,
        /// Checksum from the archive's own index.
        crc: u64,
    },

    /// Directory entry.
    Directory,
}

/// One archive member and its destination fan-out.
///
/// Entries are produced in bulk when a session opens an archive, in engine
/// index order; the position of an entry in the catalog is the exact index
/// the engine is given when asked to decode a selection. The archive-side
/// metadata is immutable; only the output-path list may be edited between
/// `open` and `extract`.
///
/// An entry with an empty output list is skipped during extraction: it is
/// never decoded and contributes nothing to progress totals. Output paths
/// are interpreted relative to the output root passed to
/// [`extract`](crate::ArchiveSession::extract); one entry may be written to
/// any number of destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    archive_path: PathBuf,
    kind: EntryKind,
    output_paths: Vec<PathBuf>,
}

impl FileEntry {
    pub(crate) fn new(archive_path: PathBuf, kind: EntryKind) -> Self {
        Self {
            archive_path,
            kind,
            output_paths: Vec::new(),
        }
    }

    /// Path of this entry inside the archive.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Kind of this entry together with its metadata.
    #[must_use]
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Uncompressed size in bytes; directories report 0.
    #[must_use]
    pub fn size(&self) -> u64 {
        match self.kind {
            EntryKind::File { size, .. } => size,
            EntryKind::Directory => 0,
        }
    }

    /// CRC from the archive index; directories report 0.
    #[must_use]
    pub fn crc(&self) -> u64 {
        match self.kind {
            EntryKind::File { crc, .. } => crc,
            EntryKind::Directory => 0,
        }
    }

    /// Returns `true` if this entry is a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// The destinations this entry will be written to, relative to the
    /// output root. Empty means the entry is skipped.
    #[must_use]
    pub fn output_paths(&self) -> &[PathBuf] {
        &self.output_paths
    }

    /// Appends a destination path for this entry.
    pub fn add_output_path(&mut self, path: impl Into<PathBuf>) {
        self.output_paths.push(path.into());
    }

    /// Removes all destination paths, returning the entry to skipped state.
    pub fn clear_output_paths(&mut self) {
        self.output_paths.clear();
    }

    /// True when no destination has been assigned.
    pub(crate) fn is_skipped(&self) -> bool {
        self.output_paths.is_empty()
    }
}
