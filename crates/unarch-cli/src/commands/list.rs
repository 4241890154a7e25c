//! List command implementation.

use anyhow::Result;
use unarch_core::ArchiveSession;

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::EntryRow;
use crate::output::OutputFormatter;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut session = ArchiveSession::new();
    add_archive_context(session.open(&args.archive, None), &args.archive)?;

    let rows: Vec<EntryRow> = session
        .file_list()
        .iter()
        .map(|entry| EntryRow {
            path: entry.archive_path().display().to_string(),
            size: entry.size(),
            crc: entry.crc(),
            is_directory: entry.is_directory(),
        })
        .collect();

    formatter.format_entry_list(&rows, args.human_readable)
}
