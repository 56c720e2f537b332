//! lockdiff - lockfile change reporter CLI tool
//!
//! Reports package changes in lockfiles across git history:
//! - Composer (composer.lock)
//! - npm (package-lock.json)

use anyhow::Context;
use clap::Parser;
use lockdiff::cli::{json_requested, CliArgs, Command, ConfigAction, Settings};
use lockdiff::config::{self, Config};
use lockdiff::domain::{ChangeStatus, DiffResult, PackageChange, PackageManagerKind};
use lockdiff::git::{SystemGit, Vcs};
use lockdiff::orchestrator::{DiffOrchestrator, ReleaseSources};
use lockdiff::output::{create_formatter, write_check, write_error, OutputConfig, OutputFormat};
use lockdiff::progress::Progress;
use lockdiff::registry::{create_source, CredentialStore, HttpClient, ResponseCache};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter
const LOG_ENV: &str = "LOCKDIFF_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let raw = std::env::args_os().map(|a| a.to_string_lossy().into_owned());
            if json_requested(raw) {
                report_error(OutputFormat::Json, &anyhow::anyhow!(usage_message(&e)));
            } else {
                let _ = e.print();
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    init_tracing(args.log_level());

    let config = load_config();
    let format = args.output_format(config.as_ref().ok());

    match run(&args, config).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            report_error(format, &e);
            match args.command() {
                Command::Check { .. } => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// First line of a clap error without its `error:` prefix
fn usage_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

/// Print a fatal error in the requested format
fn report_error(format: OutputFormat, error: &anyhow::Error) {
    if format == OutputFormat::Json {
        let mut stdout = io::stdout().lock();
        let _ = write_error(&format!("{:#}", error), &mut stdout);
        let _ = stdout.flush();
    } else {
        eprintln!("Error: {:#}", error);
    }
}

/// Main application logic
async fn run(args: &CliArgs, config: anyhow::Result<Config>) -> anyhow::Result<ExitCode> {
    if let Command::Config { action } = args.command() {
        return run_config(&action);
    }

    let config = config?;
    let settings = args.settings(&config);
    let options = args.diff_options(&config)?;

    let dir = match &args.global.working_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let vcs = SystemGit::open(&dir, settings.git_timeout).await?;
    debug!("repository root: {}", vcs.root().display());

    let sources = build_sources(&settings, &vcs)?;
    let orchestrator = DiffOrchestrator::new(Box::new(vcs), sources);

    let mut progress = Progress::new(settings.show_progress);
    progress.spinner("Reading lockfile history...");
    let prepared = orchestrator.prepare(&options).await?;
    progress.start(prepared.total(), "Fetching release counts");

    let mut enrichment = prepared.enrichment(orchestrator.sources());
    while let Some(change) = enrichment.next().await {
        progress.advance(change);
    }
    progress.finish_and_clear();
    let result = enrichment.finish();

    let mut stdout = io::stdout().lock();
    let exit_code = match args.command() {
        Command::Check { package, status } => {
            let matched = check(&result, &package, status);
            if settings.format == OutputFormat::Json {
                let changes: Vec<_> = matched.iter().map(|(_, change)| *change).collect();
                write_check(&package, &changes, &mut stdout)?;
            } else if !args.global.quiet {
                for (kind, change) in &matched {
                    writeln!(stdout, "{} [{}]", change, kind.label())?;
                }
            }
            if matched.is_empty() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        _ => {
            let color = settings.format == OutputFormat::Text && io::stdout().is_terminal();
            let formatter = create_formatter(OutputConfig::new(settings.format, color));
            formatter.format(&result, &mut stdout)?;
            ExitCode::SUCCESS
        }
    };
    stdout.flush()?;

    Ok(exit_code)
}

/// Load the configuration file; an unknown location means no configuration
fn load_config() -> anyhow::Result<Config> {
    match config::config_path() {
        Ok(path) => Ok(Config::load(&path)?),
        Err(e) => {
            warn!("{}", e);
            Ok(Config::default())
        }
    }
}

fn build_sources(settings: &Settings, vcs: &SystemGit) -> anyhow::Result<ReleaseSources> {
    let mut client = HttpClient::new()?;
    if settings.use_cache {
        match ResponseCache::default_dir() {
            Some(dir) => {
                let cache = ResponseCache::new(dir, settings.cache_ttl);
                debug!("response cache: {}", cache.dir().display());
                client = client.with_cache(cache);
            }
            None => warn!("no cache directory available, responses will not be cached"),
        }
    }

    let credentials = CredentialStore::load(vcs.root());

    let mut sources = ReleaseSources::new();
    for kind in PackageManagerKind::all() {
        sources = sources.with(create_source(*kind, client.clone(), credentials.clone()));
    }
    Ok(sources)
}

/// Changes of `package` matching the optional status, with their package manager
fn check<'a>(
    result: &'a DiffResult,
    package: &str,
    status: Option<ChangeStatus>,
) -> Vec<(PackageManagerKind, &'a PackageChange)> {
    result
        .diffs
        .iter()
        .filter_map(|diff| diff.find(package).map(|change| (diff.kind, change)))
        .filter(|(_, change)| status.map_or(true, |s| change.status == s))
        .collect()
}

/// `config` subcommand
fn run_config(action: &ConfigAction) -> anyhow::Result<ExitCode> {
    let path = config::config_path()?;
    let mut stdout = io::stdout().lock();

    match action {
        ConfigAction::Path => writeln!(stdout, "{}", path.display())?,
        ConfigAction::List => {
            let config = Config::load(&path)?;
            for (key, value) in config.entries() {
                match value {
                    Some(value) => writeln!(stdout, "{} = {}", key, value)?,
                    None => writeln!(stdout, "{} (unset)", key)?,
                }
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load(&path)?;
            match config.get(key)? {
                Some(value) => writeln!(stdout, "{}", value)?,
                None => return Ok(ExitCode::FAILURE),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(&path)?;
            config.set(key, value)?;
            config.save(&path)?;
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load(&path)?;
            if config.unset(key)? {
                config.save(&path)?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
