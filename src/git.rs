//! Git integration for reading lockfile history
//!
//! This module provides:
//! - The `Vcs` trait consumed by the orchestrator
//! - `SystemGit`, which shells out to the `git` executable
//!
//! Query failures (non-zero exit, timeout, missing revision) degrade to
//! empty output. Only locating the repository is a hard error.

use crate::error::GitError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default time limit for a single git invocation
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Version control queries needed to diff lockfiles
///
/// Paths are relative to the repository root.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Repository root directory
    fn root(&self) -> &Path;

    /// Invocation directory relative to the root (empty at the root)
    fn prefix(&self) -> &Path;

    /// Commits touching `path`, newest first, optionally as of `before`
    async fn commits_touching(&self, path: &Path, before: Option<&str>) -> Vec<String>;

    /// Whether the working tree has uncommitted changes to `path`
    async fn has_uncommitted_change(&self, path: &Path) -> bool;

    /// File content at a revision, empty on failure
    async fn content_at(&self, path: &Path, commit: &str) -> String;

    /// File content in the working tree, empty on failure
    async fn working_tree_content(&self, path: &Path) -> String;
}

/// `Vcs` implementation that runs the git executable
#[derive(Debug, Clone)]
pub struct SystemGit {
    root: PathBuf,
    prefix: PathBuf,
    timeout: Duration,
}

impl SystemGit {
    /// Locate the repository containing `dir`
    pub async fn open(dir: &Path, timeout: Duration) -> Result<Self, GitError> {
        let root = run_git(dir, &["rev-parse", "--show-toplevel"], timeout)
            .await
            .map_err(|e| lookup_error(dir, e))?;
        let prefix = run_git(dir, &["rev-parse", "--show-prefix"], timeout)
            .await
            .map_err(|e| lookup_error(dir, e))?;

        let root = PathBuf::from(root.trim_end());
        let prefix = PathBuf::from(prefix.trim_end().trim_end_matches('/'));
        debug!("repository root {}, prefix {:?}", root.display(), prefix);

        Ok(Self {
            root,
            prefix,
            timeout,
        })
    }

    async fn query(&self, args: &[&str]) -> String {
        match run_git(&self.root, args, self.timeout).await {
            Ok(output) => output,
            Err(e) => {
                debug!("{}", e);
                String::new()
            }
        }
    }
}

/// Error for a failed repository lookup; timeouts and spawn failures keep their cause
fn lookup_error(dir: &Path, error: GitError) -> GitError {
    debug!("repository lookup failed: {}", error);
    match error {
        GitError::CommandFailed { .. } => GitError::not_a_repository(dir),
        other => other,
    }
}

/// Pathspec anchored at the repository root
fn top_pathspec(path: &Path) -> String {
    format!(":(top){}", to_git_path(path))
}

/// Git always uses forward slashes in paths
fn to_git_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

async fn run_git(dir: &Path, args: &[&str], timeout: Duration) -> Result<String, GitError> {
    let command = args.first().copied().unwrap_or_default().to_string();
    let child = Command::new("git")
        .args(args)
        .current_dir(dir)
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(result) => result.map_err(|source| GitError::Spawn { source })?,
        Err(_) => {
            warn!("git {} timed out", command);
            return Err(GitError::Timeout {
                command,
                seconds: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `git log --format=%H` output
fn parse_commit_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl Vcs for SystemGit {
    fn root(&self) -> &Path {
        &self.root
    }

    fn prefix(&self) -> &Path {
        &self.prefix
    }

    async fn commits_touching(&self, path: &Path, before: Option<&str>) -> Vec<String> {
        let pathspec = top_pathspec(path);
        let mut args = vec!["log", "--format=%H"];
        if let Some(rev) = before {
            args.push(rev);
        }
        args.push("--");
        args.push(&pathspec);
        parse_commit_list(&self.query(&args).await)
    }

    async fn has_uncommitted_change(&self, path: &Path) -> bool {
        let pathspec = top_pathspec(path);
        !self
            .query(&["status", "--porcelain", "--", &pathspec])
            .await
            .trim()
            .is_empty()
    }

    async fn content_at(&self, path: &Path, commit: &str) -> String {
        let object = format!("{}:{}", commit, to_git_path(path));
        self.query(&["show", &object]).await
    }

    async fn working_tree_content(&self, path: &Path) -> String {
        let full = self.root.join(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => content,
            Err(e) => {
                debug!("failed to read {}: {}", full.display(), e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commit_list() {
        let output = "c3\nc2\n\n  c1  \n";
        assert_eq!(parse_commit_list(output), vec!["c3", "c2", "c1"]);
        assert!(parse_commit_list("").is_empty());
    }

    #[test]
    fn test_top_pathspec() {
        assert_eq!(
            top_pathspec(Path::new("app/composer.lock")),
            ":(top)app/composer.lock"
        );
    }

    #[test]
    fn test_lookup_error_keeps_timeout() {
        let timeout = GitError::Timeout {
            command: "rev-parse".to_string(),
            seconds: 0,
        };
        assert!(matches!(
            lookup_error(Path::new("/repo"), timeout),
            GitError::Timeout { .. }
        ));

        let failed = GitError::CommandFailed {
            command: "rev-parse".to_string(),
            message: "fatal: not a git repository".to_string(),
        };
        assert!(matches!(
            lookup_error(Path::new("/repo"), failed),
            GitError::NotARepository { .. }
        ));
    }

    #[tokio::test]
    async fn test_open_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemGit::open(dir.path(), DEFAULT_GIT_TIMEOUT).await;
        assert!(matches!(result, Err(GitError::NotARepository { .. })));
    }
}
