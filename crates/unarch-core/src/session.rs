//! The archive session: open, remap, extract, cancel, close.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::ErrorKind;
use crate::Result;
use crate::callbacks;
use crate::callbacks::ExtractCallbacks;
use crate::callbacks::FileChangeKind;
use crate::callbacks::LogCallback;
use crate::callbacks::LogLevel;
use crate::callbacks::PasswordCallback;
use crate::callbacks::ProgressKind;
use crate::catalog::EntryKind;
use crate::catalog::FileEntry;
use crate::engine::ArchiveReader;
use crate::engine::DecodeContext;
use crate::engine::DecodeEngine;
use crate::engine::EngineError;
use crate::engine::FormatHint;
use crate::engine::ItemInfo;
use crate::locator;
use crate::locator::EngineCandidate;
use crate::staging::StagingArea;

/// Cloneable handle to a session's cancellation flag.
///
/// `extract` is a blocking call, so cancellation has to come from another
/// thread; any clone of this handle can request it. The request is
/// cooperative: the in-flight extraction observes the flag at its next
/// progress tick and returns [`ErrorKind::ExtractCancelled`]. Once set,
/// the flag stays set until the session is closed.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation of the session's in-flight extraction, if any.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A session over one archive: catalog inspection, output remapping, and
/// two-phase extraction.
///
/// The session locates a decode engine once at construction. If none is
/// found the session is permanently invalid and every operation fails
/// deterministically; otherwise it moves between "ready" (no archive) and
/// "opened" (catalog available) via [`open`](Self::open) and
/// [`close`](Self::close).
///
/// Extraction decodes the selected entries once into a staging directory,
/// then copies each decoded file to every destination the caller assigned,
/// so one entry can fan out to any number of output paths without being
/// decoded twice.
///
/// Operations on a session are serialized by `&mut self`; the only surface
/// safe to touch from other threads is the [`CancelHandle`].
///
/// ```no_run
/// use unarch_core::{ArchiveSession, ExtractCallbacks};
///
/// # fn main() -> Result<(), unarch_core::ErrorKind> {
/// let mut session = ArchiveSession::new();
/// session.open("mod.7z", None)?;
/// for entry in session.file_list_mut() {
///     if !entry.is_directory() {
///         let name = entry.archive_path().to_path_buf();
///         entry.add_output_path(name);
///     }
/// }
/// session.extract("/tmp/out", ExtractCallbacks::new())?;
/// # Ok(())
/// # }
/// ```
pub struct ArchiveSession {
    valid: bool,
    last_error: Option<ErrorKind>,
    cancel: CancelHandle,
    total_units: u64,
    password: Option<String>,
    password_callback: PasswordCallback,
    log_callback: LogCallback,
    engine: Option<DecodeEngine>,
    reader: Option<Box<dyn ArchiveReader + Send>>,
    catalog: Vec<FileEntry>,
}

impl ArchiveSession {
    /// Creates a session using the default engine candidate list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_candidates(&locator::default_candidates())
    }

    /// Creates a session from an explicit ranked candidate list.
    ///
    /// When no candidate probes successfully the session is constructed
    /// invalid, with [`last_error`](Self::last_error) set to
    /// [`ErrorKind::LibraryNotFound`].
    #[must_use]
    pub fn with_candidates(candidates: &[EngineCandidate]) -> Self {
        let mut session = Self {
            valid: false,
            last_error: None,
            cancel: CancelHandle::new(),
            total_units: 0,
            password: None,
            password_callback: callbacks::noop_password(),
            log_callback: callbacks::noop_log(),
            engine: None,
            reader: None,
            catalog: Vec::new(),
        };

        match locator::locate(candidates) {
            Ok(engine) => {
                session.engine = Some(engine);
                session.valid = true;
            }
            Err(err) => {
                (session.log_callback)(
                    LogLevel::Error,
                    &format!("could not locate a decode engine: {err}"),
                );
                session.last_error = Some(err);
            }
        }
        session
    }

    /// Whether the session holds a usable decode engine.
    ///
    /// Open and extract failures do not invalidate a session; this only
    /// reports whether construction found an engine.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Classification of the most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&ErrorKind> {
        self.last_error.as_ref()
    }

    /// Installs (or, with `None`, removes) the log callback.
    pub fn set_log_callback(&mut self, callback: Option<LogCallback>) {
        self.log_callback = callback.unwrap_or_else(callbacks::noop_log);
    }

    /// Returns a handle that can cancel this session's extraction from
    /// another thread.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Requests cancellation of the in-flight extraction, if any.
    ///
    /// Safe to call at any time; when nothing is extracting this only
    /// arms the flag, which stays set until [`close`](Self::close).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The catalog of the currently opened archive, in engine index order.
    #[must_use]
    pub fn file_list(&self) -> &[FileEntry] {
        &self.catalog
    }

    /// Mutable catalog access, for assigning output paths.
    pub fn file_list_mut(&mut self) -> &mut [FileEntry] {
        &mut self.catalog
    }

    /// Opens an archive and (re)builds the catalog.
    ///
    /// The format is auto-detected. `password_callback` is kept for the
    /// whole session and consulted lazily, at most once, if the archive
    /// turns out to be encrypted — some formats only ask for credentials
    /// during extraction.
    ///
    /// Re-opening on an already-open session is allowed and always
    /// discards the previous catalog, even when the new open fails.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LibraryNotFound`] on an invalid session,
    /// [`ErrorKind::ArchiveNotFound`] when the path is missing or a
    /// directory, [`ErrorKind::FailedToOpenArchive`] when the engine
    /// rejects the file.
    pub fn open(
        &mut self,
        archive_path: impl AsRef<Path>,
        password_callback: Option<PasswordCallback>,
    ) -> Result<()> {
        let path = archive_path.as_ref();

        if !self.valid {
            (self.log_callback)(LogLevel::Error, "cannot open: no decode engine is loaded");
            return Err(self.invalid_session_error());
        }

        // Re-open always discards the previous catalog, even if this
        // attempt fails before the engine is reached.
        self.reader = None;
        self.catalog.clear();
        self.total_units = 0;
        self.password = None;
        self.password_callback = password_callback.unwrap_or_else(callbacks::noop_password);

        if !path.exists() || path.is_dir() {
            let err = ErrorKind::ArchiveNotFound {
                path: path.to_path_buf(),
            };
            (self.log_callback)(LogLevel::Error, &format!("archive not found: {}", path.display()));
            self.last_error = Some(err.clone());
            return Err(err);
        }

        let Some(engine) = self.engine.as_ref() else {
            return Err(self.invalid_session_error());
        };

        let password_cache = &mut self.password;
        let user_callback = &mut self.password_callback;
        let mut ask_password = || callbacks::fetch_password(password_cache, user_callback);

        match engine.open(path, FormatHint::Auto, &mut ask_password) {
            Ok(reader) => {
                self.total_units = reader
                    .items()
                    .iter()
                    .fold(0u64, |sum, item| sum.saturating_add(item.size));
                self.reset_file_list(reader.items());
                self.reader = Some(reader);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let err = ErrorKind::FailedToOpenArchive(e.to_string());
                (self.log_callback)(LogLevel::Error, &e.to_string());
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Closes the current archive, releasing the engine handle and
    /// catalog, and rearms the cancellation flag. Idempotent.
    pub fn close(&mut self) {
        self.reader = None;
        self.catalog.clear();
        self.total_units = 0;
        self.password = None;
        self.password_callback = callbacks::noop_password();
        self.cancel.reset();
    }

    /// Extracts every catalog entry that has at least one output path.
    ///
    /// Selected entries are decoded once into a fresh staging directory,
    /// then copied to each of their destinations under `output_root`,
    /// creating directories as needed. Progress and file-change events
    /// stream through `callbacks` while the decode runs; the first
    /// materialization failure is reported through the error callback and
    /// aborts the rest of the extraction. The staging directory is
    /// removed on every exit path.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ExtractCancelled`] when cancellation was observed
    /// during decode, [`ErrorKind::OutOfMemory`] when the staging area
    /// could not be created, [`ErrorKind::LibraryError`] for engine decode
    /// failures and materialization failures. An invalid or unopened
    /// session fails fast without invoking any callback.
    pub fn extract(
        &mut self,
        output_root: impl AsRef<Path>,
        callbacks: ExtractCallbacks,
    ) -> Result<()> {
        if !self.valid {
            return Err(self.invalid_session_error());
        }
        if self.reader.is_none() {
            let err = ErrorKind::LibraryError("no archive is open".to_string());
            self.last_error = Some(err.clone());
            return Err(err);
        }

        let result = self.run_extract(output_root.as_ref(), callbacks);
        match &result {
            Ok(()) => self.last_error = None,
            Err(err) => self.last_error = Some(err.clone()),
        }
        result
    }

    fn run_extract(&mut self, output_root: &Path, mut callbacks: ExtractCallbacks) -> Result<()> {
        // Select the decode index set; only selected entries contribute
        // to the progress denominator.
        let mut indices = Vec::new();
        let mut selected_units = 0u64;
        for (index, entry) in self.catalog.iter().enumerate() {
            if !entry.is_skipped() {
                indices.push(index);
                selected_units = selected_units.saturating_add(entry.size());
            }
        }
        self.total_units = selected_units;

        let staging = match StagingArea::new() {
            Ok(staging) => staging,
            Err(err) => {
                (callbacks.error)(&format!(
                    "error creating a staging directory for extraction: {err}"
                ));
                return Err(err);
            }
        };

        {
            let total = self.total_units;
            let cancel = self.cancel.clone();
            let progress_slot = &mut callbacks.progress;
            let file_slot = &mut callbacks.file_change;

            // The progress boundary is the one cancellation checkpoint:
            // the engine stops at the first tick after the flag is set.
            let mut progress = |current: u64| {
                let keep_going = progress_slot(ProgressKind::Extraction, current, total);
                keep_going && !cancel.is_cancelled()
            };
            let mut on_file =
                |path: &Path| file_slot(FileChangeKind::ExtractionStart, path);

            let password_cache = &mut self.password;
            let user_callback = &mut self.password_callback;
            let mut ask_password = || callbacks::fetch_password(password_cache, user_callback);

            let mut ctx = DecodeContext {
                progress: &mut progress,
                on_file: &mut on_file,
                password: &mut ask_password,
            };

            let Some(reader) = self.reader.as_mut() else {
                return Err(ErrorKind::LibraryError("no archive is open".to_string()));
            };
            match reader.decode(staging.path(), &indices, &mut ctx) {
                Ok(()) => {}
                Err(EngineError::Cancelled) => return Err(ErrorKind::ExtractCancelled),
                Err(EngineError::Failed(diag)) => return Err(ErrorKind::LibraryError(diag)),
            }
        }

        materialize(&self.catalog, &staging, output_root, &mut callbacks.error)
        // `staging` drops here, removing the directory whatever happened.
    }

    fn reset_file_list(&mut self, items: &[ItemInfo]) {
        self.catalog.clear();
        self.catalog.reserve(items.len());
        for item in items {
            let kind = if item.is_directory {
                EntryKind::Directory
            } else {
                EntryKind::File {
                    size: item.size,
                    crc: item.crc,
                }
            };
            self.catalog.push(FileEntry::new(item.path.clone(), kind));
        }
    }

    fn invalid_session_error(&self) -> ErrorKind {
        self.last_error
            .clone()
            .unwrap_or_else(|| ErrorKind::LibraryNotFound("session is invalid".to_string()))
    }
}

impl Default for ArchiveSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ArchiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSession")
            .field("valid", &self.valid)
            .field("last_error", &self.last_error)
            .field("entries", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

/// Copies every decoded entry to each of its destinations. The first
/// failure is reported and aborts the remaining fan-out.
fn materialize(
    catalog: &[FileEntry],
    staging: &StagingArea,
    output_root: &Path,
    error_callback: &mut crate::callbacks::ErrorCallback,
) -> Result<()> {
    for entry in catalog {
        if entry.is_directory() {
            for output in entry.output_paths() {
                let target = output_root.join(output);
                if let Err(e) = std::fs::create_dir_all(&target) {
                    let message =
                        format!("error creating output directory {}: {e}", target.display());
                    error_callback(&message);
                    return Err(ErrorKind::LibraryError(message));
                }
            }
        } else {
            for output in entry.output_paths() {
                let target = output_root.join(output);
                if let Some(parent) = target.parent() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        let message =
                            format!("error creating output directory {}: {e}", parent.display());
                        error_callback(&message);
                        return Err(ErrorKind::LibraryError(message));
                    }
                }
                let staged = staging.staged_path(entry.archive_path());
                if let Err(e) = std::fs::copy(&staged, &target) {
                    let message =
                        format!("error writing to output file {}: {e}", target.display());
                    error_callback(&message);
                    return Err(ErrorKind::LibraryError(message));
                }
            }
        }
    }
    Ok(())
}
