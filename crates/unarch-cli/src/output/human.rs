//! Human-readable terminal output.

use anyhow::Result;
use console::style;

use super::formatter::EntryRow;
use super::formatter::ExtractionSummary;
use super::formatter::OutputFormatter;

pub struct HumanFormatter {
    quiet: bool,
}

impl HumanFormatter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_entry_list(&self, entries: &[EntryRow], human_readable: bool) -> Result<()> {
        for entry in entries {
            let size = if entry.is_directory {
                String::new()
            } else if human_readable {
                humanize_bytes(entry.size)
            } else {
                entry.size.to_string()
            };

            if entry.is_directory {
                println!("{:>10}  {}", size, style(&entry.path).blue());
            } else {
                println!("{:>10}  {}", size, entry.path);
            }
        }

        if !self.quiet {
            let files = entries.iter().filter(|e| !e.is_directory).count();
            let dirs = entries.len() - files;
            println!();
            println!("{files} files, {dirs} directories");
        }
        Ok(())
    }

    fn format_extraction_result(&self, summary: &ExtractionSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        println!(
            "{} extracted {} entries to {} outputs",
            style("✓").green(),
            summary.entries_selected,
            summary.outputs_written
        );
        Ok(())
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
