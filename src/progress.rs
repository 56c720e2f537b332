//! Progress display for lockfile diffs
//!
//! Provides visual feedback on stderr using indicatif: a spinner while git
//! history is read and a bar while release counts are fetched.

use crate::domain::PackageChange;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the diff workflow
pub struct Progress {
    /// Whether progress display is enabled
    enabled: bool,
    /// Current progress bar
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Show a spinner with a message for an indeterminate operation
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Start a progress bar for a known number of registry lookups
    ///
    /// Nothing is drawn when there is nothing to look up.
    pub fn start(&mut self, total: usize, message: &str) {
        self.finish_and_clear();
        if !self.enabled || total == 0 {
            return;
        }

        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})")
            .map(|style| style.progress_chars("█▓▒░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Record one enriched change
    pub fn advance(&self, change: &PackageChange) {
        if let Some(ref bar) = self.bar {
            bar.set_message(format!("Fetched {}", change.name));
            bar.inc(1);
        }
    }

    /// Finish and clear the current progress bar
    pub fn finish_and_clear(&mut self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        self.bar = None;
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PackageManagerKind;

    #[test]
    fn test_progress_disabled() {
        let mut progress = Progress::new(false);
        progress.spinner("Reading history");
        progress.start(10, "Fetching release counts");
        assert!(progress.bar.is_none());
        progress.advance(&PackageChange::added("a", PackageManagerKind::Npm, "1.0.0"));
        progress.finish_and_clear();
    }

    #[test]
    fn test_progress_enabled() {
        let mut progress = Progress::new(true);
        progress.spinner("Reading history");
        progress.start(2, "Fetching release counts");
        assert!(progress.bar.is_some());
        progress.advance(&PackageChange::added("a", PackageManagerKind::Npm, "1.0.0"));
        progress.advance(&PackageChange::added("b", PackageManagerKind::Npm, "1.0.0"));
        progress.finish_and_clear();
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_nothing_to_enrich_draws_nothing() {
        let mut progress = Progress::new(true);
        progress.start(0, "Fetching release counts");
        assert!(progress.bar.is_none());
    }
}
