//! Property-based tests for catalog construction and selective extraction.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use proptest::prelude::*;
use unarch_core::ArchiveSession;
use unarch_core::ExtractCallbacks;
use unarch_core::test_utils::TarTestBuilder;

/// An archive body: unique paths with arbitrary small contents.
fn entries_strategy() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    prop::collection::vec(
        ("[a-z]{1,8}(/[a-z]{1,8}){0,2}", prop::collection::vec(any::<u8>(), 0..128)),
        1..8,
    )
    .prop_map(|entries| {
        // Suffix each path with its position so names never collide.
        entries
            .into_iter()
            .enumerate()
            .map(|(index, (path, data))| (format!("{path}_{index}"), data))
            .collect()
    })
}

fn build_tar(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut builder = TarTestBuilder::new();
    for (path, data) in entries {
        builder = builder.add_file(path, data);
    }
    builder.build()
}

proptest! {
    /// The catalog mirrors the archive index exactly: same length, same
    /// order, same per-entry size.
    #[test]
    fn prop_catalog_matches_index(entries in entries_strategy()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.tar");
        std::fs::write(&path, build_tar(&entries)).unwrap();

        let mut session = ArchiveSession::new();
        session.open(&path, None).unwrap();

        let list = session.file_list();
        prop_assert_eq!(list.len(), entries.len());
        for (entry, (name, data)) in list.iter().zip(&entries) {
            prop_assert_eq!(entry.archive_path(), &PathBuf::from(name));
            prop_assert_eq!(entry.size(), data.len() as u64);
            prop_assert!(!entry.is_directory());
            prop_assert!(entry.output_paths().is_empty());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Extracting an arbitrary selection writes exactly the selected
    /// entries, byte-identical, and nothing else.
    #[test]
    fn prop_selective_extraction_is_exact(
        entries in entries_strategy(),
        selection_seed in any::<u64>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.tar");
        std::fs::write(&path, build_tar(&entries)).unwrap();
        let out = dir.path().join("out");

        let mut session = ArchiveSession::new();
        session.open(&path, None).unwrap();

        let mut expected = Vec::new();
        {
            let list = session.file_list_mut();
            for (index, entry) in list.iter_mut().enumerate() {
                // Deterministic pseudo-random subset from the seed.
                if (selection_seed >> (index % 64)) & 1 == 1 {
                    let destination = format!("picked/{index}.bin");
                    entry.add_output_path(&destination);
                    expected.push((destination, entries[index].1.clone()));
                }
            }
        }

        session.extract(&out, ExtractCallbacks::new()).unwrap();

        for (destination, data) in &expected {
            prop_assert_eq!(&std::fs::read(out.join(destination)).unwrap(), data);
        }

        // Count the materialized files; nothing beyond the selection.
        let picked_dir = out.join("picked");
        let found = if picked_dir.exists() {
            std::fs::read_dir(&picked_dir).unwrap().count()
        } else {
            0
        };
        prop_assert_eq!(found, expected.len());
    }
}
