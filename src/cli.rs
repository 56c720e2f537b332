//! CLI argument parsing module for lockdiff

use crate::config::Config;
use crate::domain::{ChangeStatus, PackageManagerKind};
use crate::error::ConfigError;
use crate::orchestrator::{DiffOptions, KindFilter};
use crate::output::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Parse a change status name for `check --status`
fn parse_status(s: &str) -> Result<ChangeStatus, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "added" => Ok(ChangeStatus::Added),
        "removed" => Ok(ChangeStatus::Removed),
        "updated" => Ok(ChangeStatus::Updated),
        "downgraded" => Ok(ChangeStatus::Downgraded),
        _ => Err(format!(
            "invalid status '{}': expected added, removed, updated or downgraded",
            s
        )),
    }
}

/// Whether raw arguments ask for JSON output
///
/// Used to shape usage errors, which happen before parsing succeeds.
pub fn json_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut format = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_ref().strip_prefix("--format") {
            Some("") => format = args.next().map(|v| v.as_ref().to_string()),
            Some(rest) => {
                if let Some(value) = rest.strip_prefix('=') {
                    format = Some(value.to_string());
                }
            }
            None => {}
        }
    }
    matches!(
        format.as_deref().map(str::parse::<OutputFormat>),
        Some(Ok(OutputFormat::Json))
    )
}

/// Lockfile change reporter for Composer and npm projects
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lockdiff",
    version,
    about = "Show what changed in composer.lock and package-lock.json across git history"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Subcommands; without one, `analyse` runs
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Diff the lockfiles' latest changes (default)
    #[command(alias = "analyze")]
    Analyse,

    /// Diff the lockfiles between two revisions
    Between {
        /// Older revision
        #[arg(id = "from_rev", value_name = "FROM")]
        from: String,
        /// Newer revision
        #[arg(id = "to_rev", value_name = "TO")]
        to: String,
    },

    /// Exit 0 if a package changed, 1 if it did not
    ///
    /// Matching changes are printed one per line, or as a JSON document
    /// with `--format json`. Markdown prints lines like text.
    Check {
        /// Package name as written in the lockfile
        package: String,

        /// Only match changes with this status
        #[arg(long, value_parser = parse_status)]
        status: Option<ChangeStatus>,
    },

    /// Read or modify the persisted configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` operations
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print every key and its value
    List,
    /// Print one value
    Get { key: String },
    /// Store a value
    Set { key: String, value: String },
    /// Remove a value
    Unset { key: String },
    /// Print the configuration file location
    Path,
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Output format: text, json or markdown
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Do not read or write the registry response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Only process these package managers (comma separated or repeated)
    #[arg(long, global = true, value_delimiter = ',', action = ArgAction::Append)]
    pub include: Vec<PackageManagerKind>,

    /// Skip these package managers (comma separated or repeated)
    #[arg(long, global = true, value_delimiter = ',', action = ArgAction::Append)]
    pub exclude: Vec<PackageManagerKind>,

    /// Do not show a progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Ignore uncommitted changes and diff the last two commits
    #[arg(long, global = true)]
    pub ignore_last: bool,

    /// Older revision of an explicit range
    #[arg(long, global = true)]
    pub from: Option<String>,

    /// Newer revision of an explicit range (requires --from)
    #[arg(long, global = true)]
    pub to: Option<String>,

    /// Do not query registries for release counts
    #[arg(long, global = true)]
    pub skip_release_count: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true)]
    pub working_dir: Option<PathBuf>,
}

/// Resolved runtime settings: flags over config over defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub format: OutputFormat,
    pub use_cache: bool,
    pub show_progress: bool,
    pub cache_ttl: Duration,
    pub git_timeout: Duration,
}

impl CliArgs {
    /// The subcommand to run
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Analyse)
    }

    /// Output format: the flag, then the configuration, then text
    pub fn output_format(&self, config: Option<&Config>) -> OutputFormat {
        self.global
            .format
            .or_else(|| config.and_then(Config::output_format))
            .unwrap_or_default()
    }

    /// Default tracing filter directive
    pub fn log_level(&self) -> &'static str {
        if self.global.verbose {
            "debug"
        } else if self.global.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Combine flags with the persisted configuration
    pub fn settings(&self, config: &Config) -> Settings {
        let format = self.output_format(Some(config));
        let no_progress = self.global.no_progress || config.no_progress.unwrap_or(false);

        Settings {
            format,
            use_cache: !(self.global.no_cache || config.no_cache.unwrap_or(false)),
            show_progress: !no_progress && !self.global.quiet && format == OutputFormat::Text,
            cache_ttl: config.cache_ttl(),
            git_timeout: config.git_timeout(),
        }
    }

    /// Build validated diff options
    pub fn diff_options(&self, config: &Config) -> Result<DiffOptions, ConfigError> {
        let kinds = KindFilter::from_lists(self.global.include.clone(), self.global.exclude.clone())?;

        let (from, to) = match self.command() {
            Command::Between { from, to } => {
                if self.global.from.is_some() || self.global.to.is_some() {
                    return Err(ConfigError::conflicting(
                        "'between' takes its range as arguments, not --from/--to",
                    ));
                }
                (Some(from), Some(to))
            }
            _ => (self.global.from.clone(), self.global.to.clone()),
        };

        let options = DiffOptions {
            kinds,
            ignore_uncommitted: self.global.ignore_last,
            from,
            to,
            skip_release_count: self.global.skip_release_count
                || config.skip_release_count.unwrap_or(false),
        };
        options.validate()?;
        Ok(options)
    }
}
