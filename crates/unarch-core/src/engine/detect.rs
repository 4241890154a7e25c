//! Archive format detection.
//!
//! Detection prefers content sniffing (magic bytes) and falls back to the
//! file extension for formats without a usable signature.

use std::io::Read;
use std::path::Path;

/// 7z format magic bytes: the string "7z" followed by version bytes.
const SEVENZ_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// ZIP local-file-header and empty-archive signatures.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68]; // "BZh"
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Offset of the "ustar" marker inside a tar header block.
const TAR_MAGIC_OFFSET: usize = 257;

/// Supported archive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// XZ-compressed tar archive.
    TarXz,
    /// Zstd-compressed tar archive.
    TarZst,
    /// ZIP archive.
    Zip,
    /// 7z archive.
    SevenZ,
}

impl ArchiveKind {
    /// Human-readable format name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::TarZst => "tar.zst",
            Self::Zip => "zip",
            Self::SevenZ => "7z",
        }
    }
}

/// Detects the archive kind from file content, falling back to the
/// extension when no signature matches.
///
/// # Errors
///
/// Returns a diagnostic string when the file cannot be read or the format
/// cannot be determined either way.
pub fn detect_format(path: &Path) -> Result<ArchiveKind, String> {
    let mut header = [0u8; 512];
    let read = std::fs::File::open(path)
        .and_then(|mut f| read_up_to(&mut f, &mut header))
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    if let Some(kind) = sniff(&header[..read]) {
        return Ok(kind);
    }

    detect_by_extension(path)
        .ok_or_else(|| format!("unrecognized archive format: {}", path.display()))
}

/// Reads as many bytes as available, up to the buffer size.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn sniff(header: &[u8]) -> Option<ArchiveKind> {
    if header.starts_with(&SEVENZ_MAGIC) {
        return Some(ArchiveKind::SevenZ);
    }
    if header.starts_with(&ZIP_MAGIC) || header.starts_with(&ZIP_EMPTY_MAGIC) {
        return Some(ArchiveKind::Zip);
    }
    if header.starts_with(&GZIP_MAGIC) {
        return Some(ArchiveKind::TarGz);
    }
    if header.starts_with(&BZIP2_MAGIC) {
        return Some(ArchiveKind::TarBz2);
    }
    if header.starts_with(&XZ_MAGIC) {
        return Some(ArchiveKind::TarXz);
    }
    if header.starts_with(&ZSTD_MAGIC) {
        return Some(ArchiveKind::TarZst);
    }
    if header.len() > TAR_MAGIC_OFFSET + 5
        && &header[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5] == b"ustar"
    {
        return Some(ArchiveKind::Tar);
    }
    None
}

fn detect_by_extension(path: &Path) -> Option<ArchiveKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "tar" => Some(ArchiveKind::Tar),
        "gz" | "tgz" => Some(ArchiveKind::TarGz),
        "bz2" | "tbz" | "tbz2" => Some(ArchiveKind::TarBz2),
        "xz" | "txz" => Some(ArchiveKind::TarXz),
        "zst" | "tzst" => Some(ArchiveKind::TarZst),
        "zip" => Some(ArchiveKind::Zip),
        "7z" => Some(ArchiveKind::SevenZ),
        _ => None,
    }
}
