//! Progress bar wiring for extraction.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use unarch_core::ExtractCallbacks;

/// CLI progress bar bridged into the session's progress callback.
///
/// Displays bytes decoded, throughput, and ETA when running in a TTY.
/// Cleans up after itself on drop.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a new CLI progress bar.
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }

    /// Attaches this bar to an extraction's progress slot.
    ///
    /// The total is taken from the callback's denominator, which the
    /// session fixes to the byte sum of the selected entries.
    #[must_use]
    pub fn attach(&self, callbacks: ExtractCallbacks) -> ExtractCallbacks {
        let bar = self.bar.clone();
        callbacks.on_progress(move |_kind, current, total| {
            if bar.length() != Some(total) {
                bar.set_length(total);
            }
            bar.set_position(current);
            true
        })
    }

    /// Removes the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
