//! Output formatter trait and row types.

use anyhow::Result;
use serde::Serialize;

/// One catalog entry, flattened for display.
#[derive(Debug, Serialize)]
pub struct EntryRow {
    /// Path inside the archive.
    pub path: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Checksum from the archive index (0 when the format stores none).
    pub crc: u64,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// Result of an extraction run.
#[derive(Debug, Serialize)]
pub struct ExtractionSummary {
    /// The archive that was extracted.
    pub archive: String,
    /// Entries that had at least one destination.
    pub entries_selected: usize,
    /// Total destination paths written (fan-out counts each copy).
    pub outputs_written: usize,
}

/// Renders command results for one output mode.
pub trait OutputFormatter {
    /// Renders the entry listing of an archive.
    fn format_entry_list(&self, entries: &[EntryRow], human_readable: bool) -> Result<()>;

    /// Renders the result of an extraction.
    fn format_extraction_result(&self, summary: &ExtractionSummary) -> Result<()>;
}
