//! Archive session library: open an archive, remap its entries to output
//! paths, and extract with progress, cancellation, and error callbacks.
//!
//! `unarch-core` wraps format codec crates behind one session API. An
//! [`ArchiveSession`] opens an archive (format auto-detected), exposes its
//! entry catalog, and lets the caller assign zero, one, or many output
//! paths to each entry before extracting. Extraction is two-phase: every
//! selected entry is decoded once into a staging directory, then copied to
//! each of its destinations, so duplicating an entry across outputs never
//! costs a second decode.
//!
//! # Examples
//!
//! ```no_run
//! use unarch_core::{ArchiveSession, ExtractCallbacks};
//!
//! # fn main() -> Result<(), unarch_core::ErrorKind> {
//! let mut session = ArchiveSession::new();
//! session.open("archive.7z", None)?;
//!
//! // Extract the first file under two names.
//! let entry = &mut session.file_list_mut()[0];
//! entry.add_output_path("a.txt");
//! entry.add_output_path("copies/a.txt");
//!
//! session.extract("/tmp/out", ExtractCallbacks::new())?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod callbacks;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod locator;
pub mod session;
pub mod staging;
pub mod test_utils;

// Re-export main API types
pub use callbacks::ErrorCallback;
pub use callbacks::ExtractCallbacks;
pub use callbacks::FileChangeCallback;
pub use callbacks::FileChangeKind;
pub use callbacks::LogCallback;
pub use callbacks::LogLevel;
pub use callbacks::MAX_PASSWORD_LENGTH;
pub use callbacks::PasswordCallback;
pub use callbacks::ProgressCallback;
pub use callbacks::ProgressKind;
pub use catalog::EntryKind;
pub use catalog::FileEntry;
pub use error::ErrorKind;
pub use error::Result;
pub use locator::EngineCandidate;
pub use session::ArchiveSession;
pub use session::CancelHandle;
pub use staging::StagingArea;
