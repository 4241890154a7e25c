//! End-to-end session tests: catalog fidelity, fan-out extraction,
//! cancellation, password caching, and materialization failure handling.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use unarch_core::ArchiveSession;
use unarch_core::ErrorKind;
use unarch_core::ExtractCallbacks;
use unarch_core::FileChangeKind;
use unarch_core::test_utils::TarTestBuilder;
use unarch_core::test_utils::ZipTestBuilder;

fn write_archive(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// The three-entry layout used across several tests:
/// `a.txt` (10 bytes), `dir/`, `dir/b.txt` (20 bytes).
fn three_entry_zip() -> Vec<u8> {
    ZipTestBuilder::new()
        .add_file("a.txt", b"0123456789")
        .add_directory("dir/")
        .add_file("dir/b.txt", b"01234567890123456789")
        .build()
}

#[test]
fn test_catalog_matches_archive_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();

    let list = session.file_list();
    assert_eq!(list.len(), 3);

    assert_eq!(list[0].archive_path(), Path::new("a.txt"));
    assert_eq!(list[0].size(), 10);
    assert!(!list[0].is_directory());
    assert_ne!(list[0].crc(), 0);

    assert!(list[1].is_directory());

    assert_eq!(list[2].archive_path(), Path::new("dir/b.txt"));
    assert_eq!(list[2].size(), 20);
}

#[test]
fn test_fanout_extraction_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();

    {
        let list = session.file_list_mut();
        list[0].add_output_path("out/a.txt");
        list[0].add_output_path("out/copy_of_a.txt");
        list[2].add_output_path("out/dir/b.txt");
        // dir/ keeps its default (no destinations).
    }

    session.extract(&out, ExtractCallbacks::new()).unwrap();

    let a = std::fs::read(out.join("out/a.txt")).unwrap();
    let a_copy = std::fs::read(out.join("out/copy_of_a.txt")).unwrap();
    let b = std::fs::read(out.join("out/dir/b.txt")).unwrap();

    assert_eq!(a.len(), 10);
    assert_eq!(a, a_copy, "both destinations carry identical content");
    assert_eq!(b.len(), 20);
    assert!(session.last_error().is_none());
}

#[test]
fn test_skipped_entries_produce_no_output_and_no_progress() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();

    // Select only dir/b.txt (20 bytes); a.txt stays skipped.
    session.file_list_mut()[2].add_output_path("b.txt");

    let totals = Arc::new(Mutex::new(Vec::new()));
    let totals_clone = Arc::clone(&totals);
    let callbacks = ExtractCallbacks::new().on_progress(move |_, current, total| {
        totals_clone.lock().unwrap().push((current, total));
        true
    });

    session.extract(&out, callbacks).unwrap();

    assert!(out.join("b.txt").exists());
    assert!(!out.join("a.txt").exists());

    let ticks = totals.lock().unwrap();
    assert!(!ticks.is_empty());
    for (current, total) in ticks.iter() {
        assert_eq!(*total, 20, "denominator counts only selected entries");
        assert!(*current <= *total);
    }
    assert_eq!(ticks.last().unwrap().0, 20, "final tick reaches the total");
}

#[test]
fn test_entry_decoded_once_despite_fanout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();

    {
        let list = session.file_list_mut();
        for destination in ["one.txt", "two.txt", "three.txt", "four.txt"] {
            list[0].add_output_path(destination);
        }
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    let callbacks = ExtractCallbacks::new().on_file_change(move |kind, path| {
        assert_eq!(kind, FileChangeKind::ExtractionStart);
        events_clone.lock().unwrap().push(path.to_path_buf());
    });

    session.extract(&out, callbacks).unwrap();

    for destination in ["one.txt", "two.txt", "three.txt", "four.txt"] {
        assert_eq!(std::fs::read(out.join(destination)).unwrap(), b"0123456789");
    }
    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[PathBuf::from("a.txt")],
        "four destinations, one decode"
    );
}

#[test]
fn test_cancel_before_extract_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();
    session.file_list_mut()[0].add_output_path("a.txt");

    session.cancel();
    let result = session.extract(&out, ExtractCallbacks::new());

    assert_eq!(result, Err(ErrorKind::ExtractCancelled));
    assert_eq!(session.last_error(), Some(&ErrorKind::ExtractCancelled));
    assert!(!out.join("a.txt").exists(), "nothing may be materialized");
}

#[test]
fn test_cancel_handle_from_progress_callback() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();
    session.file_list_mut()[0].add_output_path("a.txt");
    session.file_list_mut()[2].add_output_path("b.txt");

    // Cancel from "another thread" the moment the first tick arrives.
    let handle = session.cancel_handle();
    let callbacks = ExtractCallbacks::new().on_progress(move |_, _, _| {
        handle.cancel();
        true
    });

    let result = session.extract(&out, callbacks);
    assert_eq!(result, Err(ErrorKind::ExtractCancelled));
}

#[test]
fn test_progress_returning_false_cancels() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();
    session.file_list_mut()[0].add_output_path("a.txt");

    let callbacks = ExtractCallbacks::new().on_progress(|_, _, _| false);
    let result = session.extract(&out, callbacks);
    assert_eq!(result, Err(ErrorKind::ExtractCancelled));
}

#[test]
fn test_cancelled_session_can_extract_after_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();
    session.cancel();

    session.close();
    session.open(&path, None).unwrap();
    session.file_list_mut()[0].add_output_path("a.txt");

    session.extract(&out, ExtractCallbacks::new()).unwrap();
    assert!(out.join("a.txt").exists());
}

#[test]
fn test_password_callback_invoked_once_for_two_encrypted_members() {
    let dir = tempfile::tempdir().unwrap();
    let data = ZipTestBuilder::new()
        .add_encrypted_file("first.txt", b"first secret", "secret")
        .add_encrypted_file("second.txt", b"second secret", "secret")
        .build();
    let path = write_archive(dir.path(), "locked.zip", &data);
    let out = dir.path().join("extracted");

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);

    let mut session = ArchiveSession::new();
    session
        .open(
            &path,
            Some(Box::new(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                "secret".to_string()
            })),
        )
        .unwrap();

    {
        let list = session.file_list_mut();
        list[0].add_output_path("first.txt");
        list[1].add_output_path("second.txt");
    }

    session.extract(&out, ExtractCallbacks::new()).unwrap();

    assert_eq!(std::fs::read(out.join("first.txt")).unwrap(), b"first secret");
    assert_eq!(
        std::fs::read(out.join("second.txt")).unwrap(),
        b"second secret"
    );
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "the password is cached for the whole session"
    );
}

#[test]
fn test_materialization_failure_aborts_and_reports_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");
    std::fs::create_dir_all(&out).unwrap();
    // A plain file where the first entry wants a directory.
    std::fs::write(out.join("blocker"), b"in the way").unwrap();

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();
    {
        let list = session.file_list_mut();
        list[0].add_output_path("blocker/a.txt");
        list[2].add_output_path("later/b.txt");
    }

    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_clone = Arc::clone(&errors);
    let callbacks = ExtractCallbacks::new().on_error(move |message| {
        errors_clone.lock().unwrap().push(message.to_string());
    });

    let result = session.extract(&out, callbacks);

    assert!(matches!(result, Err(ErrorKind::LibraryError(_))));
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1, "first failure is fatal, reported once");
    assert!(errors[0].contains("blocker"), "message names the failing path");
    assert!(
        !out.join("later/b.txt").exists(),
        "entries after the failure are not materialized"
    );
}

#[test]
fn test_tar_gz_archive_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let tar_data = TarTestBuilder::new()
        .add_file("a.txt", b"0123456789")
        .add_directory("dir/")
        .add_file("dir/b.txt", b"01234567890123456789")
        .build();
    let path = write_archive(
        dir.path(),
        "three.tar.gz",
        &unarch_core::test_utils::gzip(&tar_data),
    );
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();

    assert_eq!(session.file_list().len(), 3);
    {
        let list = session.file_list_mut();
        list[0].add_output_path("renamed.txt");
        list[1].add_output_path("made/explicitly");
        list[2].add_output_path("deep/copy/b.txt");
    }

    session.extract(&out, ExtractCallbacks::new()).unwrap();

    assert_eq!(std::fs::read(out.join("renamed.txt")).unwrap(), b"0123456789");
    assert!(out.join("made/explicitly").is_dir());
    assert_eq!(
        std::fs::read(out.join("deep/copy/b.txt")).unwrap(),
        b"01234567890123456789"
    );
}

#[test]
fn test_reopen_swaps_catalogs_completely() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_archive(dir.path(), "first.zip", &three_entry_zip());
    let second_data = ZipTestBuilder::new()
        .add_file("other.txt", b"different archive")
        .build();
    let second = write_archive(dir.path(), "second.zip", &second_data);

    let mut session = ArchiveSession::new();
    session.open(&first, None).unwrap();
    session.file_list_mut()[0].add_output_path("a.txt");

    session.open(&second, None).unwrap();
    let list = session.file_list();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].archive_path(), Path::new("other.txt"));
    assert!(
        list[0].output_paths().is_empty(),
        "destinations never leak across opens"
    );
}

#[test]
fn test_extract_twice_on_same_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();
    session.file_list_mut()[0].add_output_path("a.txt");

    let out1 = dir.path().join("run1");
    let out2 = dir.path().join("run2");
    session.extract(&out1, ExtractCallbacks::new()).unwrap();
    session.extract(&out2, ExtractCallbacks::new()).unwrap();

    assert!(out1.join("a.txt").exists());
    assert!(out2.join("a.txt").exists());
}

#[test]
fn test_empty_selection_extracts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(dir.path(), "three.zip", &three_entry_zip());
    let out = dir.path().join("extracted");

    let mut session = ArchiveSession::new();
    session.open(&path, None).unwrap();

    session.extract(&out, ExtractCallbacks::new()).unwrap();

    assert!(
        !out.join("a.txt").exists() && !out.join("dir").exists(),
        "no destinations assigned, no output produced"
    );
}
