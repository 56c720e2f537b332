//! Diff orchestrator for coordinating the whole lockfile diff workflow
//!
//! This module provides:
//! - Workflow coordination: select revisions → read → extract → diff → enrich
//! - Package manager filter application
//! - A two-phase entry point so callers can drive a progress indicator
//!
//! Only option conflicts are errors here. Unreadable lockfiles are empty and
//! registry failures leave the release count unset.

use crate::diff::{classify, compute_diff};
use crate::domain::{
    ChangeStatus, DependencyDiff, DependencyFileState, DiffResult, PackageChange,
    PackageManagerKind, UnchangedLockfile,
};
use crate::error::ConfigError;
use crate::git::Vcs;
use crate::lockfile::get_extractor;
use crate::registry::{ReleaseQuery, ReleaseSource};
use crate::revision::{RevisionPair, RevisionSelector, Selection, SkipReason};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Which package managers to process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KindFilter {
    /// Every supported package manager
    #[default]
    All,
    /// Only the listed package managers
    Include(Vec<PackageManagerKind>),
    /// Every package manager except the listed ones
    Exclude(Vec<PackageManagerKind>),
}

impl KindFilter {
    /// Build a filter from include and exclude lists; both at once is an error
    pub fn from_lists(
        include: Vec<PackageManagerKind>,
        exclude: Vec<PackageManagerKind>,
    ) -> Result<Self, ConfigError> {
        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(KindFilter::All),
            (false, true) => Ok(KindFilter::Include(include)),
            (true, false) => Ok(KindFilter::Exclude(exclude)),
            (false, false) => Err(ConfigError::conflicting(
                "--include and --exclude cannot be used together",
            )),
        }
    }

    /// Check whether a package manager should be processed
    pub fn allows(&self, kind: PackageManagerKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Include(kinds) => kinds.contains(&kind),
            KindFilter::Exclude(kinds) => !kinds.contains(&kind),
        }
    }

    /// Selected package managers in configured order
    pub fn kinds(&self) -> Vec<PackageManagerKind> {
        PackageManagerKind::all()
            .iter()
            .copied()
            .filter(|kind| self.allows(*kind))
            .collect()
    }
}

/// Options for one diff invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Package managers to process
    pub kinds: KindFilter,
    /// Treat every lockfile as having no uncommitted changes
    pub ignore_uncommitted: bool,
    /// Explicit older revision
    pub from: Option<String>,
    /// Explicit newer revision; absent with `from` means the working tree
    pub to: Option<String>,
    /// Do not query registries for release counts
    pub skip_release_count: bool,
}

impl DiffOptions {
    /// Reject option combinations that cannot be honored together
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ignore_uncommitted && (self.from.is_some() || self.to.is_some()) {
            return Err(ConfigError::conflicting(
                "--ignore-last cannot be combined with --from or --to",
            ));
        }
        if self.to.is_some() && self.from.is_none() {
            return Err(ConfigError::conflicting("--to requires --from"));
        }
        // Revisions are passed to git as arguments
        for (key, rev) in [("from", &self.from), ("to", &self.to)] {
            if let Some(rev) = rev.as_deref().filter(|r| r.is_empty() || r.starts_with('-')) {
                return Err(ConfigError::invalid_value(key, rev, "not a revision"));
            }
        }
        Ok(())
    }

    /// Returns true if an explicit revision range was requested
    pub fn is_explicit_range(&self) -> bool {
        self.from.is_some()
    }
}

/// Release sources by package manager
#[derive(Default)]
pub struct ReleaseSources {
    sources: Vec<Box<dyn ReleaseSource>>,
}

impl ReleaseSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source, replacing any earlier one for the same package manager
    pub fn with(mut self, source: Box<dyn ReleaseSource>) -> Self {
        self.sources.retain(|s| s.kind() != source.kind());
        self.sources.push(source);
        self
    }

    pub fn get(&self, kind: PackageManagerKind) -> Option<&dyn ReleaseSource> {
        self.sources
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
    }
}

/// Orchestrator for coordinating the diff workflow
pub struct DiffOrchestrator {
    vcs: Box<dyn Vcs>,
    sources: ReleaseSources,
}

impl DiffOrchestrator {
    /// Create a new orchestrator over a repository and its release sources
    pub fn new(vcs: Box<dyn Vcs>, sources: ReleaseSources) -> Self {
        Self { vcs, sources }
    }

    pub fn sources(&self) -> &ReleaseSources {
        &self.sources
    }

    /// Run the whole workflow, enriching every change before returning
    pub async fn run(&self, options: &DiffOptions) -> Result<DiffResult, ConfigError> {
        let prepared = self.prepare(options).await?;
        Ok(prepared.enrichment(&self.sources).finish_all().await)
    }

    /// Phase one: everything except registry lookups
    pub async fn prepare(&self, options: &DiffOptions) -> Result<PreparedDiff, ConfigError> {
        options.validate()?;
        if options.is_explicit_range() {
            debug!(
                "explicit range {}..{}",
                options.from.as_deref().unwrap_or_default(),
                options.to.as_deref().unwrap_or("working tree")
            );
        }

        let mut prepared = PreparedDiff::default();
        for kind in options.kinds.kinds() {
            self.prepare_lockfile(kind, options, &mut prepared).await;
        }

        if !options.skip_release_count {
            for (d, lockfile) in prepared.lockfiles.iter().enumerate() {
                for (c, change) in lockfile.diff.changes.iter().enumerate() {
                    if change.status.is_version_change() {
                        prepared.pending.push((d, c));
                    }
                }
            }
        }

        info!(
            "prepared {} lockfile diff(s), {} change(s) to enrich",
            prepared.lockfiles.len(),
            prepared.pending.len()
        );
        Ok(prepared)
    }

    async fn prepare_lockfile(
        &self,
        kind: PackageManagerKind,
        options: &DiffOptions,
        prepared: &mut PreparedDiff,
    ) {
        let path = self.vcs.prefix().join(kind.lockfile_name());

        let selection = match options.from.as_deref() {
            Some(from) => {
                let to = options.to.as_deref();
                let at_to = self.vcs.commits_touching(&path, to).await;
                let at_from = self.vcs.commits_touching(&path, Some(from)).await;
                RevisionSelector::refine(from, to, &at_to, &at_from)
            }
            None => {
                let commits = self.vcs.commits_touching(&path, None).await;
                let uncommitted =
                    !options.ignore_uncommitted && self.vcs.has_uncommitted_change(&path).await;
                let state = DependencyFileState::new(&path, kind, uncommitted, commits);
                if state.has_uncommitted_changes {
                    prepared.has_uncommitted_changes = true;
                }
                RevisionSelector::select(&state)
            }
        };

        let pair = match selection {
            Selection::Compare(pair) => pair,
            Selection::Skip(SkipReason::NoHistory) => {
                debug!("skipping {}: no history", path.display());
                return;
            }
            Selection::Skip(SkipReason::UntouchedSince(since)) => {
                debug!("{} unchanged since {}", path.display(), since);
                prepared.unchanged.push(UnchangedLockfile { path, kind, since });
                return;
            }
        };

        if let Some(lockfile) = self.diff_lockfile(path, kind, pair).await {
            prepared.lockfiles.push(lockfile);
        }
    }

    async fn diff_lockfile(
        &self,
        path: PathBuf,
        kind: PackageManagerKind,
        pair: RevisionPair,
    ) -> Option<PreparedLockfile> {
        let current = match &pair.to {
            Some(commit) => self.vcs.content_at(&path, commit).await,
            None => self.vcs.working_tree_content(&path).await,
        };
        if current.trim().is_empty() {
            debug!("skipping {}: empty at the newer revision", path.display());
            return None;
        }
        let previous = match &pair.from {
            Some(commit) => self.vcs.content_at(&path, commit).await,
            None => String::new(),
        };

        let extractor = get_extractor(kind);
        let mut changes = compute_diff(
            &extractor.extract(&previous),
            &extractor.extract(&current),
            kind,
        );
        for change in &mut changes {
            if let Some((from, to)) = change.versions() {
                change.semver = classify(from, to);
            }
        }
        debug!("{}: {} change(s)", path.display(), changes.len());

        Some(PreparedLockfile {
            repository_urls: extractor.repository_urls(&current),
            diff: DependencyDiff::new(path, kind, pair.from, pair.to, pair.is_new, changes),
        })
    }
}

struct PreparedLockfile {
    diff: DependencyDiff,
    repository_urls: HashMap<String, String>,
}

/// Result of phase one, waiting for release counts
#[derive(Default)]
pub struct PreparedDiff {
    lockfiles: Vec<PreparedLockfile>,
    /// (lockfile index, change index) of every change still to enrich
    pending: Vec<(usize, usize)>,
    has_uncommitted_changes: bool,
    unchanged: Vec<UnchangedLockfile>,
}

impl PreparedDiff {
    /// Number of changes that will be enriched
    pub fn total(&self) -> usize {
        self.pending.len()
    }

    /// Phase two, one registry lookup per step
    pub fn enrichment(self, sources: &ReleaseSources) -> Enrichment<'_> {
        Enrichment {
            prepared: self,
            sources,
            cursor: 0,
        }
    }

    fn into_result(self) -> DiffResult {
        DiffResult {
            diffs: self.lockfiles.into_iter().map(|l| l.diff).collect(),
            has_uncommitted_changes: self.has_uncommitted_changes,
            unchanged: self.unchanged,
        }
    }
}

/// Step-by-step release count enrichment
pub struct Enrichment<'a> {
    prepared: PreparedDiff,
    sources: &'a ReleaseSources,
    cursor: usize,
}

impl Enrichment<'_> {
    /// Number of changes enriched so far
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Enrich the next change and return it, or None when done
    pub async fn next(&mut self) -> Option<&PackageChange> {
        let &(d, c) = self.prepared.pending.get(self.cursor)?;
        self.cursor += 1;

        let lockfile = &self.prepared.lockfiles[d];
        let change = &lockfile.diff.changes[c];
        let release_count = match self.sources.get(change.kind) {
            Some(source) => {
                let repository_url = lockfile.repository_urls.get(&change.name);
                release_count(source, change, repository_url.map(String::as_str)).await
            }
            None => None,
        };

        let change = &mut self.prepared.lockfiles[d].diff.changes[c];
        change.release_count = release_count;
        Some(&*change)
    }

    /// Finish, enriching whatever is left
    pub async fn finish_all(mut self) -> DiffResult {
        while self.next().await.is_some() {}
        self.finish()
    }

    /// The result, with release counts for every change enriched so far
    pub fn finish(self) -> DiffResult {
        self.prepared.into_result()
    }
}

/// Count releases between the two versions of a change
///
/// Downgrades count the releases stepped back over.
async fn release_count(
    source: &dyn ReleaseSource,
    change: &PackageChange,
    repository_url: Option<&str>,
) -> Option<usize> {
    let (from, to) = change.versions()?;
    let (from, to) = if change.status == ChangeStatus::Downgraded {
        (to, from)
    } else {
        (from, to)
    };

    let query = ReleaseQuery {
        package: &change.name,
        from,
        to,
        repository_url,
    };
    match source.releases_between(&query).await {
        Ok(releases) => Some(releases.len()),
        Err(e) => {
            warn!("release count unavailable for {}: {}", change.name, e);
            None
        }
    }
}
