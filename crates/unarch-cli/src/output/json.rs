//! JSON output for scripted consumers.

use anyhow::Result;

use super::formatter::EntryRow;
use super::formatter::ExtractionSummary;
use super::formatter::OutputFormatter;

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_entry_list(&self, entries: &[EntryRow], _human_readable: bool) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(entries)?);
        Ok(())
    }

    fn format_extraction_result(&self, summary: &ExtractionSummary) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(summary)?);
        Ok(())
    }
}
