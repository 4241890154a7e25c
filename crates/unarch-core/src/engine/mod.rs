//! The decode engine boundary.
//!
//! Everything that understands archive binary formats lives behind this
//! module: the session only ever sees [`DecodeEngine`], [`ArchiveReader`]
//! and the callback slots in [`DecodeContext`]. Format backends translate
//! their codec crate's native failure signaling into [`EngineError`] before
//! it crosses into orchestration code.

use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

pub mod detect;

#[cfg(feature = "sevenz")]
mod sevenz;
#[cfg(feature = "tar-family")]
mod tar;
#[cfg(feature = "zip")]
mod zip;

use detect::ArchiveKind;

/// Buffer size for decode copies; progress is reported between chunks.
const DECODE_CHUNK: usize = 64 * 1024;

/// Failure modes at the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The progress slot asked the engine to stop.
    Cancelled,
    /// Anything else the codec reported; the payload is its diagnostic.
    Failed(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "decode cancelled"),
            Self::Failed(diag) => write!(f, "{diag}"),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Result alias for engine-boundary operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Metadata for one archive item, as reported by the archive's own index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    /// Path of the item inside the archive.
    pub path: PathBuf,
    /// Uncompressed size in bytes (0 for directories).
    pub size: u64,
    /// Checksum from the index; 0 when the format records none.
    pub crc: u64,
    /// Whether the item is a directory.
    pub is_directory: bool,
}

/// Callback slots injected into a backend for the duration of one decode.
///
/// Backends hold no callback state of their own; the session wires these
/// up per call, which keeps cancellation and password caching in one place.
pub struct DecodeContext<'a> {
    /// Progress tick with cumulative decoded bytes. A `false` return asks
    /// the backend to stop at the next opportunity.
    pub progress: &'a mut dyn FnMut(u64) -> bool,
    /// Invoked with each item's archive path as its decode begins.
    pub on_file: &'a mut dyn FnMut(&Path),
    /// Invoked when the backend needs credentials.
    pub password: &'a mut dyn FnMut() -> String,
}

/// An opened archive: the index, plus selective decode into a directory.
pub trait ArchiveReader {
    /// Number of items in the archive index.
    fn items_count(&self) -> usize {
        self.items().len()
    }

    /// The archive index, in engine order. Positions in this slice are the
    /// indices [`decode`](Self::decode) expects.
    fn items(&self) -> &[ItemInfo];

    /// Decodes exactly the items named by `indices` into `staging_root`,
    /// each under its archive-relative path. Directory indices are
    /// accepted and ignored (they cost nothing to decode).
    fn decode(
        &mut self,
        staging_root: &Path,
        indices: &[usize],
        ctx: &mut DecodeContext<'_>,
    ) -> EngineResult<()>;
}

/// A format backend: recognizes one family of archive kinds and opens them.
pub(crate) trait FormatBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn handles(&self, kind: ArchiveKind) -> bool;

    fn open(
        &self,
        path: &Path,
        kind: ArchiveKind,
        password: &mut dyn FnMut() -> String,
    ) -> EngineResult<Box<dyn ArchiveReader + Send>>;
}

/// Format selection for [`DecodeEngine::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    /// Detect the format from file content, falling back to the extension.
    Auto,
    /// Skip detection and use the named format.
    Kind(ArchiveKind),
}

/// The decode engine: a set of format backends behind one `open` call.
pub struct DecodeEngine {
    backends: Vec<Box<dyn FormatBackend>>,
}

impl DecodeEngine {
    /// Assembles the engine from the format backends compiled into this
    /// build. Fails with a diagnostic when no backend feature is enabled.
    pub(crate) fn builtin() -> std::result::Result<Self, String> {
        #[allow(unused_mut)]
        let mut backends: Vec<Box<dyn FormatBackend>> = Vec::new();

        #[cfg(feature = "sevenz")]
        backends.push(Box::new(sevenz::SevenZBackend));
        #[cfg(feature = "zip")]
        backends.push(Box::new(zip::ZipBackend));
        #[cfg(feature = "tar-family")]
        backends.push(Box::new(tar::TarBackend));

        if backends.is_empty() {
            return Err("no format backends compiled into this build".to_string());
        }
        Ok(Self { backends })
    }

    /// Opens an archive, detecting its format unless a hint names one.
    ///
    /// The password slot is consulted only if the archive's header turns
    /// out to need credentials; unencrypted archives never trigger it.
    pub fn open(
        &self,
        path: &Path,
        hint: FormatHint,
        password: &mut dyn FnMut() -> String,
    ) -> EngineResult<Box<dyn ArchiveReader + Send>> {
        let kind = match hint {
            FormatHint::Auto => detect::detect_format(path).map_err(EngineError::Failed)?,
            FormatHint::Kind(kind) => kind,
        };

        let backend = self
            .backends
            .iter()
            .find(|b| b.handles(kind))
            .ok_or_else(|| {
                EngineError::Failed(format!("no backend handles {} archives", kind.name()))
            })?;

        backend.open(path, kind, password)
    }

    /// Names of the compiled-in backends, in probe order.
    #[must_use]
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }
}

impl std::fmt::Debug for DecodeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeEngine")
            .field("backends", &self.backend_names())
            .finish()
    }
}

/// Copies a decoded stream to a staging file in chunks, feeding cumulative
/// byte counts to the progress slot between chunks.
///
/// Shared by every backend so cancellation granularity is uniform.
#[cfg(any(feature = "sevenz", feature = "zip", feature = "tar-family"))]
pub(crate) fn copy_with_progress<R: Read + ?Sized, W: Write>(
    reader: &mut R,
    writer: &mut W,
    decoded_total: &mut u64,
    progress: &mut dyn FnMut(u64) -> bool,
) -> EngineResult<u64> {
    let mut buf = [0u8; DECODE_CHUNK];
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        written += n as u64;
        *decoded_total += n as u64;
        if !progress(*decoded_total) {
            return Err(EngineError::Cancelled);
        }
    }
    Ok(written)
}

/// Creates the staging-side parent directory for a decoded file.
#[cfg(any(feature = "sevenz", feature = "zip", feature = "tar-family"))]
pub(crate) fn ensure_staged_parent(staged_path: &Path) -> EngineResult<()> {
    if let Some(parent) = staged_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
