//! 7z backend, via sevenz-rust2.
//!
//! The metadata pass uses `Archive::read`, which parses the index without
//! decoding content; decode goes through the per-entry callback API so the
//! backend can filter by index and report chunked progress. 7z encrypts
//! either the header (credentials needed at open) or only the content
//! (credentials needed mid-decode); both paths land on the same password
//! slot.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;

use sevenz_rust2::Archive;
use sevenz_rust2::Password;

use super::ArchiveReader;
use super::DecodeContext;
use super::EngineError;
use super::EngineResult;
use super::FormatBackend;
use super::ItemInfo;
use super::copy_with_progress;
use super::detect::ArchiveKind;
use super::ensure_staged_parent;

pub(crate) struct SevenZBackend;

impl FormatBackend for SevenZBackend {
    fn name(&self) -> &'static str {
        "7z"
    }

    fn handles(&self, kind: ArchiveKind) -> bool {
        kind == ArchiveKind::SevenZ
    }

    fn open(
        &self,
        path: &Path,
        _kind: ArchiveKind,
        password: &mut dyn FnMut() -> String,
    ) -> EngineResult<Box<dyn ArchiveReader + Send>> {
        let mut file = File::open(path)?;

        let (archive, used_password) = match Archive::read(&mut file, &Password::empty()) {
            Ok(archive) => (archive, None),
            Err(e) if is_password_failure(&e.to_string()) => {
                // Header-encrypted archive: ask for credentials and retry.
                let pw = password();
                file.rewind()?;
                let archive =
                    Archive::read(&mut file, &Password::from(pw.as_str())).map_err(|e| {
                        EngineError::Failed(format!("failed to open 7z archive: {e}"))
                    })?;
                (archive, Some(pw))
            }
            Err(e) => {
                return Err(EngineError::Failed(format!(
                    "failed to open 7z archive: {e}"
                )));
            }
        };

        let items = archive
            .files
            .iter()
            .map(|entry| ItemInfo {
                path: PathBuf::from(&entry.name),
                size: entry.size,
                crc: entry.crc,
                is_directory: entry.is_directory(),
            })
            .collect();

        Ok(Box::new(SevenZReader {
            path: path.to_path_buf(),
            items,
            password: used_password,
        }))
    }
}

struct SevenZReader {
    path: PathBuf,
    items: Vec<ItemInfo>,
    password: Option<String>,
}

impl ArchiveReader for SevenZReader {
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

        let selected: HashSet<usize> = indices.iter().copied().collect();
        match self.run_decode(staging_root, &selected, ctx) {
            Err(EngineError::Failed(diag))
                if self.password.is_none() && is_password_failure(&diag) =>
            {
                // Content-encrypted archive: fetch credentials once, then
                // restart the decode with them.
                self.password = Some((ctx.password)());
                self.run_decode(staging_root, &selected, ctx)
            }
            other => other,
        }
    }
}

impl SevenZReader {
    fn run_decode(
        &self,
        staging_root: &Path,
        selected: &HashSet<usize>,
        ctx: &mut DecodeContext<'_>,
    ) -> EngineResult<()> {
        let mut file = File::open(&self.path)?;

        let mut position = 0usize;
        let mut decoded = 0u64;
        let mut cancelled = false;

        let extract_fn = |_entry: &sevenz_rust2::ArchiveEntry,
                          reader: &mut dyn Read,
                          _dest: &PathBuf|
         -> std::result::Result<bool, sevenz_rust2::Error> {
            let index = position;
            position += 1;

            if !selected.contains(&index) {
                return Ok(true);
            }
            let Some(info) = self.items.get(index) else {
                return Ok(true);
            };
            if info.is_directory {
                return Ok(true);
            }

            (ctx.on_file)(&info.path);

            let staged = staging_root.join(&info.path);
            ensure_staged_parent(&staged)
                .map_err(|e| sevenz_rust2::Error::Other(e.to_string().into()))?;
            let mut out = File::create(&staged)?;

            match copy_with_progress(reader, &mut out, &mut decoded, ctx.progress) {
                Ok(_) => Ok(true),
                Err(EngineError::Cancelled) => {
                    cancelled = true;
                    Err(sevenz_rust2::Error::Other("decode cancelled".into()))
                }
                Err(EngineError::Failed(diag)) => Err(sevenz_rust2::Error::Other(diag.into())),
            }
        };

        let result = match &self.password {
            Some(pw) => sevenz_rust2::decompress_with_extract_fn_and_password(
                &mut file,
                staging_root,
                Password::from(pw.as_str()),
                extract_fn,
            ),
            None => sevenz_rust2::decompress_with_extract_fn(&mut file, staging_root, extract_fn),
        };

        match result {
            Ok(()) => Ok(()),
            Err(_) if cancelled => Err(EngineError::Cancelled),
            Err(e) => Err(EngineError::Failed(format!("7z decode failed: {e}"))),
        }
    }
}

/// Heuristic over the codec's error text; the crate does not expose a
/// stable encrypted/credentials error variant across versions.
fn is_password_failure(diag: &str) -> bool {
    let lower = diag.to_lowercase();
    lower.contains("password") || lower.contains("encrypt")
}
