//! Extract command implementation.

use std::env;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use unarch_core::ArchiveSession;
use unarch_core::ExtractCallbacks;
use unarch_core::PasswordCallback;

use crate::cli::ExtractArgs;
use crate::cli::parse_mapping;
use crate::error::add_archive_context;
use crate::output::ExtractionSummary;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let mut session = ArchiveSession::new();

    // Ctrl-C requests cooperative cancellation; the in-flight extract
    // observes it at its next progress tick.
    let handle = session.cancel_handle();
    let _ = ctrlc::set_handler(move || handle.cancel());

    add_archive_context(
        session.open(&args.archive, Some(password_callback(args.password.clone()))),
        &args.archive,
    )?;

    apply_mappings(&mut session, &args.map)?;

    let entries_selected = session
        .file_list()
        .iter()
        .filter(|entry| !entry.output_paths().is_empty())
        .count();
    let outputs_written = session
        .file_list()
        .iter()
        .map(|entry| entry.output_paths().len())
        .sum();

    let mut callbacks = ExtractCallbacks::new().on_error(|message| {
        eprintln!("{}", console::style(message).red());
    });

    let progress = (CliProgress::should_show() && !quiet).then(|| CliProgress::new("Extracting"));
    if let Some(bar) = &progress {
        callbacks = bar.attach(callbacks);
    }

    let result = session.extract(&output_dir, callbacks);
    if let Some(bar) = &progress {
        bar.finish();
    }
    add_archive_context(result, &args.archive)?;

    formatter.format_extraction_result(&ExtractionSummary {
        archive: args.archive.display().to_string(),
        entries_selected,
        outputs_written,
    })
}

/// Uses the `--password` value when given, otherwise prompts on demand.
/// The session only invokes this if the archive is actually encrypted.
fn password_callback(flag: Option<String>) -> PasswordCallback {
    match flag {
        Some(password) => Box::new(move || password.clone()),
        None => Box::new(|| {
            dialoguer::Password::new()
                .with_prompt("Archive password")
                .interact()
                .unwrap_or_default()
        }),
    }
}

/// Applies `--map ENTRY=DEST` arguments to the catalog. Without any
/// mapping, every entry extracts to its own archive path.
fn apply_mappings(session: &mut ArchiveSession, mappings: &[String]) -> Result<()> {
    if mappings.is_empty() {
        for entry in session.file_list_mut() {
            let path = entry.archive_path().to_path_buf();
            entry.add_output_path(path);
        }
        return Ok(());
    }

    for raw in mappings {
        let (name, destination) = parse_mapping(raw).map_err(|e| anyhow!(e))?;
        let entry = session
            .file_list_mut()
            .iter_mut()
            .find(|entry| entry.archive_path() == Path::new(name))
            .with_context(|| format!("no such entry in archive: {name}"))?;
        entry.add_output_path(destination);
    }
    Ok(())
}
