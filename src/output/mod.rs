//! Output formatting for diff results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing
//! - Markdown output for pull request descriptions and changelogs

mod json;
mod markdown;
mod text;

pub use json::{write_check, write_error, JsonFormatter};
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

use crate::domain::DiffResult;
use crate::error::ConfigError;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
    /// Markdown tables
    Markdown,
}

impl OutputFormat {
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(ConfigError::InvalidFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for output formatting
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// Output format (text, json, markdown)
    pub format: OutputFormat,
    /// Whether to use colors (text only)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the diff result
    fn format(&self, result: &DiffResult, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new()),
    }
}

/// Abbreviate full object ids; symbolic revisions are kept as given
pub(crate) fn short_commit(commit: &str) -> &str {
    if commit.len() == 40 && commit.chars().all(|c| c.is_ascii_hexdigit()) {
        &commit[..7]
    } else {
        commit
    }
}

/// Human label of one end of a compared range
pub(crate) fn revision_label(commit: Option<&str>, working_tree: &str) -> String {
    match commit {
        Some(commit) => short_commit(commit).to_string(),
        None => working_tree.to_string(),
    }
}
