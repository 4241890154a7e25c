//! Tar-family backend: plain tar plus gz/bz2/xz/zst compressed variants.
//!
//! Tar is a streaming format with no central index, so `open` performs one
//! full header scan to build the item table and `decode` re-streams the
//! file, extracting only the selected indices. The index of an entry in
//! the scan equals its position in the decode stream.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use super::ArchiveReader;
use super::DecodeContext;
use super::EngineError;
use super::EngineResult;
use super::FormatBackend;
use super::ItemInfo;
use super::copy_with_progress;
use super::detect::ArchiveKind;
use super::ensure_staged_parent;

pub(crate) struct TarBackend;

impl FormatBackend for TarBackend {
    fn name(&self) -> &'static str {
        "tar"
    }

    fn handles(&self, kind: ArchiveKind) -> bool {
        matches!(
            kind,
            ArchiveKind::Tar
                | ArchiveKind::TarGz
                | ArchiveKind::TarBz2
                | ArchiveKind::TarXz
                | ArchiveKind::TarZst
        )
    }

    fn open(
        &self,
        path: &Path,
        kind: ArchiveKind,
        _password: &mut dyn FnMut() -> String,
    ) -> EngineResult<Box<dyn ArchiveReader + Send>> {
        let items = scan_items(path, kind)?;
        Ok(Box::new(TarReader {
            path: path.to_path_buf(),
            kind,
            items,
        }))
    }
}

struct TarReader {
    path: PathBuf,
    kind: ArchiveKind,
    items: Vec<ItemInfo>,
}

impl ArchiveReader for TarReader {
    fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    fn decode(
        &mut self,
        staging_root: &Path,
        indices: &[usize],
        ctx: &mut DecodeContext<'_>,
    ) -> EngineResult<()> {
        // Tick before the first byte so a cancel issued before decode
        // starts is observed with nothing staged.
        if !(ctx.progress)(0) {
            return Err(EngineError::Cancelled);
        }

        let selected: HashSet<usize> = indices.iter().copied().collect();
        let mut archive = open_decoded(&self.path, self.kind)?;
        let entries = archive
            .entries()
            .map_err(|e| EngineError::Failed(format!("failed to read tar entries: {e}")))?;

        let mut decoded = 0u64;
        for (index, entry) in entries.enumerate() {
            if !selected.contains(&index) {
                continue;
            }
            let Some(info) = self.items.get(index) else {
                continue;
            };
            if info.is_directory {
                continue;
            }

            let mut entry = entry
                .map_err(|e| EngineError::Failed(format!("failed to read tar entry: {e}")))?;
            (ctx.on_file)(&info.path);

            let staged = staging_root.join(&info.path);
            ensure_staged_parent(&staged)?;
            let mut out = File::create(&staged)?;
            copy_with_progress(&mut entry, &mut out, &mut decoded, ctx.progress)?;
        }

        Ok(())
    }
}

/// Opens the archive file behind the decompressor matching its kind.
fn open_decoded(path: &Path, kind: ArchiveKind) -> EngineResult<tar::Archive<Box<dyn Read>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let decoder: Box<dyn Read> = match kind {
        ArchiveKind::Tar => Box::new(reader),
        ArchiveKind::TarGz => Box::new(flate2::read::GzDecoder::new(reader)),
        ArchiveKind::TarBz2 => Box::new(bzip2::read::BzDecoder::new(reader)),
        ArchiveKind::TarXz => Box::new(xz2::read::XzDecoder::new(reader)),
        ArchiveKind::TarZst => Box::new(
            zstd::stream::read::Decoder::new(reader)
                .map_err(|e| EngineError::Failed(format!("failed to open zstd stream: {e}")))?,
        ),
        ArchiveKind::Zip | ArchiveKind::SevenZ => {
            return Err(EngineError::Failed(format!(
                "{} is not a tar-family format",
                kind.name()
            )));
        }
    };

    Ok(tar::Archive::new(decoder))
}

fn scan_items(path: &Path, kind: ArchiveKind) -> EngineResult<Vec<ItemInfo>> {
    let mut archive = open_decoded(path, kind)?;
    let entries = archive
        .entries()
        .map_err(|e| EngineError::Failed(format!("failed to open tar archive: {e}")))?;

    let mut items = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| EngineError::Failed(format!("failed to read tar entry: {e}")))?;
        let path = entry
            .path()
            .map_err(|e| EngineError::Failed(format!("invalid tar entry path: {e}")))?
            .into_owned();

        items.push(ItemInfo {
            path,
            size: entry.size(),
            // The tar index stores no checksums over file content.
            crc: 0,
            is_directory: entry.header().entry_type() == tar::EntryType::Directory,
        });
    }
    Ok(items)
}
