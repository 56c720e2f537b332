//! Per-lockfile and overall diff result types

use super::{ChangeStatus, PackageChange, PackageManagerKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Git state of one lockfile, gathered once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyFileState {
    /// Lockfile path relative to the repository root
    pub path: PathBuf,
    /// Package manager owning the lockfile
    pub kind: PackageManagerKind,
    /// Whether the working tree has uncommitted modifications to the file
    pub has_uncommitted_changes: bool,
    /// Commits that touched the file, newest first
    pub commits: Vec<String>,
}

impl DependencyFileState {
    pub fn new(
        path: impl Into<PathBuf>,
        kind: PackageManagerKind,
        has_uncommitted_changes: bool,
        commits: Vec<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            has_uncommitted_changes,
            commits,
        }
    }

    /// Returns true if at least one commit touched the file
    pub fn has_history(&self) -> bool {
        !self.commits.is_empty()
    }
}

/// Diff of a single lockfile between two revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDiff {
    /// Lockfile path relative to the repository root
    pub path: PathBuf,
    /// Package manager owning the lockfile
    pub kind: PackageManagerKind,
    /// Older revision; absent when the file did not exist before
    pub from_commit: Option<String>,
    /// Newer revision; absent means the working tree
    pub to_commit: Option<String>,
    /// Whether the file was created within the compared range
    pub is_new: bool,
    /// Changes ordered by package name
    pub changes: Vec<PackageChange>,
}

impl DependencyDiff {
    /// Creates a diff; a new file never carries a `from` commit
    pub fn new(
        path: impl Into<PathBuf>,
        kind: PackageManagerKind,
        from_commit: Option<String>,
        to_commit: Option<String>,
        is_new: bool,
        changes: Vec<PackageChange>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            from_commit: if is_new { None } else { from_commit },
            to_commit,
            is_new,
            changes,
        }
    }

    /// Returns true if the `to` side is the working tree
    pub fn is_working_tree(&self) -> bool {
        self.to_commit.is_none()
    }

    /// Counts changes with the given status
    pub fn count(&self, status: ChangeStatus) -> usize {
        self.changes.iter().filter(|c| c.status == status).count()
    }

    /// Finds the change for a package name
    pub fn find(&self, name: &str) -> Option<&PackageChange> {
        self.changes
            .binary_search_by(|c| c.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.changes[idx])
    }
}

/// Lockfile that was not modified inside an explicit revision range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnchangedLockfile {
    pub path: PathBuf,
    pub kind: PackageManagerKind,
    /// Revision since which the file is untouched
    pub since: String,
}

/// Result of a whole invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// One diff per lockfile with something to compare, in configured kind order
    pub diffs: Vec<DependencyDiff>,
    /// Whether any processed lockfile had uncommitted changes
    pub has_uncommitted_changes: bool,
    /// Lockfiles untouched within an explicit range
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unchanged: Vec<UnchangedLockfile>,
}

impl DiffResult {
    /// Total number of changes across all lockfiles
    pub fn total_changes(&self) -> usize {
        self.diffs.iter().map(|d| d.changes.len()).sum()
    }

    /// Iterates over every change of every lockfile
    pub fn changes(&self) -> impl Iterator<Item = &PackageChange> {
        self.diffs.iter().flat_map(|d| d.changes.iter())
    }

    /// Returns true if no lockfile reported any change
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}
