//! Callback contracts between a session, its caller, and the decode engine.
//!
//! All contracts are optional from the caller's point of view; internally
//! every slot is filled with a per-session no-op so orchestration code never
//! has to test for presence before invoking one.

use std::path::Path;

/// Severity of a [`LogCallback`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Informational message.
    Info,
    /// Something unexpected but non-fatal.
    Warning,
    /// A failure that is also surfaced through a `Result`.
    Error,
}

/// What a progress figure measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    /// Progress through the archive's compressed stream. Can reach 100%
    /// well before extraction completes when output writing dominates.
    Archive,
    /// Progress of extraction itself; 100% means every selected entry has
    /// been decoded.
    Extraction,
}

/// Phase marker for [`FileChangeCallback`] notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    /// The engine is starting to decode the named entry.
    ExtractionStart,
    /// The engine finished the named entry.
    ExtractionEnd,
}

/// Longest password accepted from a [`PasswordCallback`]; anything longer
/// is truncated before it reaches the engine.
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Receives log messages. Fire-and-forget; must not block.
pub type LogCallback = Box<dyn FnMut(LogLevel, &str) + Send>;

/// Receives progress ticks `(kind, current_units, total_units)` at
/// engine-determined intervals. Returning `false` requests that the engine
/// stop as soon as feasible; this is cooperative, not preemptive.
pub type ProgressCallback = Box<dyn FnMut(ProgressKind, u64, u64) -> bool + Send>;

/// Notified once per file as the engine begins processing it.
pub type FileChangeCallback = Box<dyn FnMut(FileChangeKind, &Path) + Send>;

/// Asked for the archive password, at most once per session, and only if
/// the archive turns out to be encrypted.
pub type PasswordCallback = Box<dyn FnMut() -> String + Send>;

/// Receives a human-readable diagnostic for failures that are reported
/// alongside (not instead of) the structured error result.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

pub(crate) fn noop_log() -> LogCallback {
    Box::new(|_, _| {})
}

pub(crate) fn noop_password() -> PasswordCallback {
    Box::new(String::new)
}

/// Clamps a password to [`MAX_PASSWORD_LENGTH`] characters.
pub(crate) fn truncate_password(password: String) -> String {
    if password.chars().count() <= MAX_PASSWORD_LENGTH {
        password
    } else {
        password.chars().take(MAX_PASSWORD_LENGTH).collect()
    }
}

/// Returns the session's cached password, invoking the caller's callback
/// on first use only.
pub(crate) fn fetch_password(
    cache: &mut Option<String>,
    callback: &mut PasswordCallback,
) -> String {
    if cache.is_none() {
        *cache = Some(truncate_password(callback()));
    }
    cache.clone().unwrap_or_default()
}

/// The callbacks observed by one `extract` call.
///
/// Every slot defaults to a no-op, so a plain
/// `ExtractCallbacks::default()` asks for a silent extraction. The builder
/// methods replace individual slots:
///
/// ```
/// use unarch_core::ExtractCallbacks;
///
/// let callbacks = ExtractCallbacks::new()
///     .on_progress(|_kind, current, total| {
///         println!("{current}/{total}");
///         true // keep going
///     })
///     .on_error(|message| eprintln!("{message}"));
/// ```
pub struct ExtractCallbacks {
    pub(crate) progress: ProgressCallback,
    pub(crate) file_change: FileChangeCallback,
    pub(crate) error: ErrorCallback,
}

impl ExtractCallbacks {
    /// Creates a bundle with every slot set to a no-op.
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress: Box::new(|_, _, _| true),
            file_change: Box::new(|_, _| {}),
            error: Box::new(|_| {}),
        }
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn on_progress(
        mut self,
        f: impl FnMut(ProgressKind, u64, u64) -> bool + Send + 'static,
    ) -> Self {
        self.progress = Box::new(f);
        self
    }

    /// Sets the file-change callback.
    #[must_use]
    pub fn on_file_change(
        mut self,
        f: impl FnMut(FileChangeKind, &Path) + Send + 'static,
    ) -> Self {
        self.file_change = Box::new(f);
        self
    }

    /// Sets the error callback.
    #[must_use]
    pub fn on_error(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.error = Box::new(f);
        self
    }
}

impl Default for ExtractCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtractCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractCallbacks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[test]
    fn test_default_callbacks_are_noops() {
        let mut callbacks = ExtractCallbacks::default();
        assert!((callbacks.progress)(ProgressKind::Extraction, 0, 100));
        (callbacks.file_change)(FileChangeKind::ExtractionStart, Path::new("a.txt"));
        (callbacks.error)("nothing listens");
    }

    #[test]
    fn test_builder_replaces_slots() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let mut callbacks = ExtractCallbacks::new().on_error(move |message| {
            seen_clone.lock().unwrap().push(message.to_string());
        });

        (callbacks.error)("boom");
        assert_eq!(seen.lock().unwrap().as_slice(), &["boom".to_string()]);
    }

    #[test]
    fn test_progress_return_value_passes_through() {
        let mut callbacks = ExtractCallbacks::new().on_progress(|_, current, _| current < 10);
        assert!((callbacks.progress)(ProgressKind::Extraction, 5, 100));
        assert!(!(callbacks.progress)(ProgressKind::Extraction, 10, 100));
    }

    #[test]
    fn test_truncate_password_short_unchanged() {
        assert_eq!(truncate_password("secret".into()), "secret");
    }

    #[test]
    fn test_truncate_password_long_clamped() {
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 50);
        let clamped = truncate_password(long);
        assert_eq!(clamped.chars().count(), MAX_PASSWORD_LENGTH);
    }

    #[test]
    fn test_fetch_password_caches_first_answer() {
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = Arc::clone(&calls);
        let mut callback: PasswordCallback = Box::new(move || {
            *calls_clone.lock().unwrap() += 1;
            "secret".to_string()
        });

        let mut cache = None;
        assert_eq!(fetch_password(&mut cache, &mut callback), "secret");
        assert_eq!(fetch_password(&mut cache, &mut callback), "secret");
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
