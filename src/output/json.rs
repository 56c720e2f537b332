//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of diff results with a status summary
//! - The `{"error": "..."}` shape used for fatal errors
//! - The `check` subcommand's matches

use crate::domain::{ChangeStatus, DependencyDiff, DiffResult, PackageChange, UnchangedLockfile};
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Summary statistics
    summary: JsonSummary,
    /// Whether any lockfile had uncommitted changes
    has_uncommitted_changes: bool,
    /// Per-lockfile diffs
    diffs: &'a [DependencyDiff],
    /// Lockfiles untouched within an explicit range
    #[serde(skip_serializing_if = "is_empty")]
    unchanged: &'a [UnchangedLockfile],
}

/// Change counts by status
#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    added: usize,
    removed: usize,
    updated: usize,
    downgraded: usize,
}

impl JsonSummary {
    fn from_result(result: &DiffResult) -> Self {
        let count = |status| result.changes().filter(|c| c.status == status).count();
        Self {
            total: result.total_changes(),
            added: count(ChangeStatus::Added),
            removed: count(ChangeStatus::Removed),
            updated: count(ChangeStatus::Updated),
            downgraded: count(ChangeStatus::Downgraded),
        }
    }
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

#[derive(Serialize)]
struct JsonError<'a> {
    error: &'a str,
}

/// Write a fatal error as `{"error": "..."}`
pub fn write_error(message: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string(&JsonError { error: message })?;
    writeln!(writer, "{}", json)
}

#[derive(Serialize)]
struct JsonCheck<'a> {
    package: &'a str,
    matched: bool,
    changes: &'a [&'a PackageChange],
}

/// Write the changes matched by `check`
pub fn write_check(
    package: &str,
    changes: &[&PackageChange],
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    let output = JsonCheck {
        package,
        matched: !changes.is_empty(),
        changes,
    };
    let json = serde_json::to_string_pretty(&output)?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &DiffResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            summary: JsonSummary::from_result(result),
            has_uncommitted_changes: result.has_uncommitted_changes,
            diffs: &result.diffs,
            unchanged: &result.unchanged,
        };
        let json = serde_json::to_string_pretty(&output)?;
        writeln!(writer, "{}", json)
    }
}
