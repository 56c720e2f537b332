//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One block per lockfile with the compared revisions
//! - Aligned change lines with semver level and release count
//! - Notes for untouched lockfiles and uncommitted changes

use crate::domain::{ChangeStatus, DependencyDiff, DiffResult, PackageChange, SemverLevel};
use crate::output::{revision_label, OutputFormatter};
use colored::Colorize;
use std::io::Write;

const WORKING_TREE: &str = "working tree";

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color option
    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, diff: &DependencyDiff, writer: &mut dyn Write) -> std::io::Result<()> {
        let path = diff.path.display().to_string();
        let range = if diff.is_new {
            format!("new in {}", revision_label(diff.to_commit.as_deref(), WORKING_TREE))
        } else {
            format!(
                "{} → {}",
                revision_label(diff.from_commit.as_deref(), "(none)"),
                revision_label(diff.to_commit.as_deref(), WORKING_TREE)
            )
        };

        writeln!(
            writer,
            "{} {} {}",
            self.paint(&path, |s| s.bold()),
            self.paint(&format!("({})", diff.kind.display_name()), |s| s.dimmed()),
            self.paint(&range, |s| s.dimmed())
        )
    }

    fn format_change(
        &self,
        change: &PackageChange,
        name_width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", change.name, width = name_width);
        let from = change.from.as_deref().unwrap_or_default();
        let to = change.to.as_deref().unwrap_or_default();

        let body = match change.status {
            ChangeStatus::Added => format!("{} {}", self.paint("added", |s| s.green()), to),
            ChangeStatus::Removed => format!("{} {}", self.paint("removed", |s| s.red()), from),
            ChangeStatus::Updated => format!(
                "{} {} {}",
                self.paint(from, |s| s.dimmed()),
                self.paint("→", |s| s.dimmed()),
                self.paint(to, |s| s.bright_white().bold())
            ),
            ChangeStatus::Downgraded => format!(
                "{} {} {} {}",
                self.paint(from, |s| s.dimmed()),
                self.paint("→", |s| s.dimmed()),
                self.paint(to, |s| s.bright_white().bold()),
                self.paint("(downgrade)", |s| s.yellow())
            ),
        };

        let mut extra = String::new();
        if let Some(level) = change.semver {
            extra.push_str(&format!(" [{}]", self.semver_label(level)));
        }
        if let Some(count) = change.release_count {
            let releases = if count == 1 { "release" } else { "releases" };
            extra.push_str(&self.paint(&format!(" {} {}", count, releases), |s| s.dimmed()));
        }

        writeln!(writer, "  {} {}{}", name, body, extra)
    }

    fn semver_label(&self, level: SemverLevel) -> String {
        if !self.color {
            return level.label().to_string();
        }
        match level {
            SemverLevel::Major => level.label().red().bold().to_string(),
            SemverLevel::Minor => level.label().yellow().to_string(),
            SemverLevel::Patch => level.label().green().to_string(),
        }
    }

    fn format_summary(&self, result: &DiffResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let count = |status| result.changes().filter(|c| c.status == status).count();
        let parts: Vec<String> = [
            ChangeStatus::Added,
            ChangeStatus::Removed,
            ChangeStatus::Updated,
            ChangeStatus::Downgraded,
        ]
        .into_iter()
        .map(|status| (status, count(status)))
        .filter(|(_, n)| *n > 0)
        .map(|(status, n)| format!("{} {}", n, status.label()))
        .collect();

        writeln!(
            writer,
            "{}",
            self.paint(&format!("Summary: {}", parts.join(", ")), |s| s.bold())
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &DiffResult, writer: &mut dyn Write) -> std::io::Result<()> {
        for diff in &result.diffs {
            self.format_header(diff, writer)?;
            if diff.changes.is_empty() {
                writeln!(writer, "  {}", self.paint("no package changes", |s| s.dimmed()))?;
            }
            let name_width = diff
                .changes
                .iter()
                .map(|c| c.name.len())
                .max()
                .unwrap_or(0)
                .max(20);
            for change in &diff.changes {
                self.format_change(change, name_width, writer)?;
            }
            writeln!(writer)?;
        }

        for lockfile in &result.unchanged {
            writeln!(
                writer,
                "{} {}",
                self.paint(&lockfile.path.display().to_string(), |s| s.bold()),
                self.paint(&format!("unchanged since {}", lockfile.since), |s| s.dimmed())
            )?;
        }

        if result.is_empty() {
            writeln!(writer, "No lockfile changes found.")?;
        } else {
            self.format_summary(result, writer)?;
        }

        if result.has_uncommitted_changes {
            writeln!(
                writer,
                "{}",
                self.paint("Includes uncommitted working tree changes.", |s| s.yellow())
            )?;
        }
        Ok(())
    }
}
