//! Error conversion utilities for CLI.
//!
//! Converts unarch-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use anyhow::anyhow;
use std::path::Path;
use unarch_core::ErrorKind;

/// Converts [`ErrorKind`] to a user-friendly anyhow error with context.
pub fn convert_session_error(err: ErrorKind, archive: &Path) -> anyhow::Error {
    match err {
        ErrorKind::LibraryNotFound(diag) => {
            anyhow!(
                "No decode engine available: {diag}\n\
                 HINT: This build was compiled without any format backend."
            )
        }
        ErrorKind::ArchiveNotFound { path } => {
            anyhow!(
                "Archive not found: {}\n\
                 HINT: Check the path; directories cannot be opened as archives.",
                path.display()
            )
        }
        ErrorKind::FailedToOpenArchive(diag) => {
            anyhow!(
                "Cannot open archive '{}': {diag}\n\
                 HINT: The file may be corrupted, encrypted with a wrong password, \
                 or in an unsupported format (supported: tar, tar.gz, tar.bz2, \
                 tar.xz, tar.zst, zip, 7z).",
                archive.display()
            )
        }
        ErrorKind::ExtractCancelled => {
            anyhow!("Extraction of '{}' was cancelled.", archive.display())
        }
        ErrorKind::OutOfMemory(diag) => {
            anyhow!(
                "Could not create a staging directory for '{}': {diag}\n\
                 HINT: Check free space and permissions on the system temp directory.",
                archive.display()
            )
        }
        ErrorKind::LibraryError(diag) => {
            anyhow!("Extraction of '{}' failed: {diag}", archive.display())
        }
    }
}

/// Adds archive context to a core result.
pub fn add_archive_context<T>(result: Result<T, ErrorKind>, archive: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_session_error(e, archive))
}
