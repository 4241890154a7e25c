//! Error types for archive session operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ErrorKind`].
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Errors that can occur while operating an archive session.
///
/// Every public session operation returns a `Result` carrying one of these,
/// and the same value is recorded as the session's sticky
/// [`last_error`](crate::ArchiveSession::last_error), so callers can either
/// inspect the return value or poll the session state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No decode engine could be located from the candidate list.
    ///
    /// This is a session-level, permanent failure: the session stays
    /// invalid and every subsequent operation fails without touching
    /// engine state. The payload is the diagnostic from the last
    /// candidate that was tried.
    #[error("no decode engine could be located: {0}")]
    LibraryNotFound(String),

    /// The archive path does not exist, or points at a directory.
    #[error("archive not found: {path}")]
    ArchiveNotFound {
        /// The path that failed the open-time existence check.
        path: PathBuf,
    },

    /// The engine rejected the file (corrupt or unsupported format).
    #[error("failed to open archive: {0}")]
    FailedToOpenArchive(String),

    /// Cooperative cancellation was observed during decode.
    #[error("extraction cancelled")]
    ExtractCancelled,

    /// Any other engine-reported failure, or a filesystem failure while
    /// materializing decoded entries to their destinations.
    #[error("extraction failed: {0}")]
    LibraryError(String),

    /// The staging area could not be created (resource exhaustion class,
    /// not literal heap exhaustion).
    #[error("failed to create staging area: {0}")]
    OutOfMemory(String),
}

impl ErrorKind {
    /// Returns `true` if this error permanently invalidates the session.
    ///
    /// Only a missing decode engine is permanent; everything else is a
    /// per-call failure that leaves the session usable.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::LibraryNotFound(_))
    }

    /// Returns `true` if this error is the result of cancellation rather
    /// than a genuine failure.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::ExtractCancelled)
    }

    /// Returns the diagnostic text carried by this error, if any.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::LibraryNotFound(diag)
            | Self::FailedToOpenArchive(diag)
            | Self::LibraryError(diag)
            | Self::OutOfMemory(diag) => Some(diag),
            Self::ArchiveNotFound { .. } | Self::ExtractCancelled => None,
        }
    }
}
