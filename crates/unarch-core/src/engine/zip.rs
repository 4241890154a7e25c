//! ZIP backend.
//!
//! ZIP has a central directory, so the item table comes straight from the
//! index and decode is random-access per entry. Encrypted entries
//! (ZipCrypto or AES) pull credentials from the password slot on demand.

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use zip::ZipArchive;

use super::ArchiveReader;
use super::DecodeContext;
use super::EngineError;
use super::EngineResult;
use super::FormatBackend;
use super::ItemInfo;
use super::copy_with_progress;
use super::detect::ArchiveKind;
use super::ensure_staged_parent;

pub(crate) struct ZipBackend;

impl FormatBackend for ZipBackend {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn handles(&self, kind: ArchiveKind) -> bool {
        kind == ArchiveKind::Zip
    }

    fn open(
        &self,
        path: &Path,
        _kind: ArchiveKind,
        _password: &mut dyn FnMut() -> String,
    ) -> EngineResult<Box<dyn ArchiveReader + Send>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| EngineError::Failed(format!("failed to open ZIP archive: {e}")))?;

        let mut items = Vec::with_capacity(archive.len());
        let mut encrypted = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index).map_err(|e| {
                EngineError::Failed(format!("failed to read ZIP entry {index}: {e}"))
            })?;
            items.push(ItemInfo {
                path: PathBuf::from(entry.name()),
                size: entry.size(),
                crc: u64::from(entry.crc32()),
                is_directory: entry.is_dir(),
            });
            encrypted.push(entry.encrypted());
        }

        Ok(Box::new(ZipReader {
            archive,
            items,
            encrypted,
        }))
    }
}

struct ZipReader {
    archive: ZipArchive<File>,
    items: Vec<ItemInfo>,
    encrypted: Vec<bool>,
}

impl ArchiveReader for ZipReader {
    fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    fn decode(
        &mut self,
        staging_root: &Path,
        indices: &[usize],
        ctx: &mut DecodeContext<'_>,
    ) -> EngineResult<()> {
        if !(ctx.progress)(0) {
            return Err(EngineError::Cancelled);
        }

        let mut decoded = 0u64;
        for &index in indices {
            let Some(info) = self.items.get(index) else {
                continue;
            };
            if info.is_directory {
                continue;
            }

            (ctx.on_file)(&info.path);
            let staged = staging_root.join(&info.path);
            ensure_staged_parent(&staged)?;
            let mut out = File::create(&staged)?;

            if self.encrypted.get(index).copied().unwrap_or(false) {
                let password = (ctx.password)();
                let mut entry = self
                    .archive
                    .by_index_decrypt(index, password.as_bytes())
                    .map_err(|e| {
                        EngineError::Failed(format!("failed to decrypt ZIP entry {index}: {e}"))
                    })?;
                copy_with_progress(&mut entry, &mut out, &mut decoded, ctx.progress)?;
            } else {
                let mut entry = self.archive.by_index(index).map_err(|e| {
                    EngineError::Failed(format!("failed to read ZIP entry {index}: {e}"))
                })?;
                copy_with_progress(&mut entry, &mut out, &mut decoded, ctx.progress)?;
            }
        }

        Ok(())
    }
}
