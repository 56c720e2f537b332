//! Markdown output formatter
//!
//! One section and table per lockfile, suitable for pull request bodies.

use crate::domain::{DependencyDiff, DiffResult, PackageChange};
use crate::output::{revision_label, OutputFormatter};
use std::io::Write;

/// Markdown formatter
#[derive(Debug, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    fn format_diff(&self, diff: &DependencyDiff, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            writer,
            "### {} ({})\n",
            diff.path.display(),
            diff.kind.display_name()
        )?;

        let to = revision_label(diff.to_commit.as_deref(), "working tree");
        if diff.is_new {
            writeln!(writer, "New lockfile in `{}`\n", to)?;
        } else {
            let from = revision_label(diff.from_commit.as_deref(), "(none)");
            writeln!(writer, "`{}` → `{}`\n", from, to)?;
        }

        if diff.changes.is_empty() {
            return writeln!(writer, "_No package changes._\n");
        }

        writeln!(writer, "| Package | From | To | Status | Semver | Releases |")?;
        writeln!(writer, "|---|---|---|---|---|---|")?;
        for change in &diff.changes {
            self.format_row(change, writer)?;
        }
        writeln!(writer)
    }

    fn format_row(&self, change: &PackageChange, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} | {} |",
            escape(&change.name),
            change.from.as_deref().map(escape).unwrap_or_default(),
            change.to.as_deref().map(escape).unwrap_or_default(),
            change.status.label(),
            change.semver.map(|s| s.label()).unwrap_or_default(),
            change
                .release_count
                .map(|n| n.to_string())
                .unwrap_or_default()
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}

impl OutputFormatter for MarkdownFormatter {
    fn format(&self, result: &DiffResult, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "## Lockfile changes\n")?;

        if result.diffs.is_empty() {
            writeln!(writer, "No lockfile changes found.\n")?;
        }
        for diff in &result.diffs {
            self.format_diff(diff, writer)?;
        }

        for lockfile in &result.unchanged {
            writeln!(
                writer,
                "> `{}` unchanged since `{}`\n",
                lockfile.path.display(),
                lockfile.since
            )?;
        }

        if result.has_uncommitted_changes {
            writeln!(writer, "_Includes uncommitted working tree changes._")?;
        }
        Ok(())
    }
}
