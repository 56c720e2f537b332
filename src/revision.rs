//! Revision selection for a single lockfile
//!
//! Decides which two revisions of a lockfile to compare:
//! - automatic selection from the file's own commit log and working tree state
//! - refinement of an explicit range, detecting new and untouched files

use crate::domain::DependencyFileState;
use std::fmt;

/// The pair of revisions to diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPair {
    /// Older revision; None means "nothing existed before"
    pub from: Option<String>,
    /// Newer revision; None means the working tree
    pub to: Option<String>,
    /// Whether the file came into existence within the range
    pub is_new: bool,
}

impl RevisionPair {
    fn new(from: Option<String>, to: Option<String>, is_new: bool) -> Self {
        Self {
            from: if is_new { None } else { from },
            to,
            is_new,
        }
    }
}

/// Why a lockfile contributes nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No commits and no uncommitted changes
    NoHistory,
    /// The file exists but was not modified after this revision
    UntouchedSince(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoHistory => write!(f, "no history"),
            SkipReason::UntouchedSince(rev) => write!(f, "unchanged since {}", rev),
        }
    }
}

/// Outcome of revision selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Compare(RevisionPair),
    Skip(SkipReason),
}

/// Selects the revisions to compare for one lockfile
pub struct RevisionSelector;

impl RevisionSelector {
    /// Automatic selection
    ///
    /// With uncommitted changes the working tree is compared against the
    /// newest commit. Otherwise the newest commit is compared against the one
    /// before it. A file whose only commit is the newest one was created there.
    pub fn select(state: &DependencyFileState) -> Selection {
        let newest = state.commits.first().cloned();

        if state.has_uncommitted_changes {
            let is_new = newest.is_none();
            return Selection::Compare(RevisionPair::new(newest, None, is_new));
        }

        if !state.has_history() {
            return Selection::Skip(SkipReason::NoHistory);
        }
        let from = state.commits.get(1).cloned();
        let is_new = from.is_none();
        Selection::Compare(RevisionPair::new(from, newest, is_new))
    }

    /// Refine an explicitly requested range
    ///
    /// `from` is any revision, not necessarily one that touched the file.
    /// `commits_at_to` and `commits_at_from` are the file's commit logs as
    /// seen from each end of the range, newest first.
    pub fn refine(
        from: &str,
        to: Option<&str>,
        commits_at_to: &[String],
        commits_at_from: &[String],
    ) -> Selection {
        // The working tree side exists whenever the caller reached this point
        if to.is_some() && commits_at_to.is_empty() {
            return Selection::Skip(SkipReason::NoHistory);
        }

        if commits_at_from.is_empty() {
            return Selection::Compare(RevisionPair::new(None, to.map(str::to_string), true));
        }

        if to.is_some() && commits_at_to.first() == commits_at_from.first() {
            return Selection::Skip(SkipReason::UntouchedSince(from.to_string()));
        }

        Selection::Compare(RevisionPair::new(
            Some(from.to_string()),
            to.map(str::to_string),
            false,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PackageManagerKind;

    fn state(commits: &[&str], uncommitted: bool) -> DependencyFileState {
        DependencyFileState::new(
            "composer.lock",
            PackageManagerKind::Composer,
            uncommitted,
            commits.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn commits(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|c| c.to_string()).collect()
    }

    fn pair(from: Option<&str>, to: Option<&str>, is_new: bool) -> Selection {
        Selection::Compare(RevisionPair {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            is_new,
        })
    }

    #[test]
    fn test_history_without_uncommitted_changes() {
        assert_eq!(
            RevisionSelector::select(&state(&["c3", "c2", "c1"], false)),
            pair(Some("c2"), Some("c3"), false)
        );
    }

    #[test]
    fn test_single_commit_is_new_file() {
        assert_eq!(
            RevisionSelector::select(&state(&["c1"], false)),
            pair(None, Some("c1"), true)
        );
    }

    #[test]
    fn test_uncommitted_against_newest_commit() {
        assert_eq!(
            RevisionSelector::select(&state(&["c1"], true)),
            pair(Some("c1"), None, false)
        );
        assert_eq!(
            RevisionSelector::select(&state(&["c3", "c2"], true)),
            pair(Some("c3"), None, false)
        );
    }

    #[test]
    fn test_uncommitted_never_committed() {
        assert_eq!(
            RevisionSelector::select(&state(&[], true)),
            pair(None, None, true)
        );
    }

    #[test]
    fn test_no_history_skips() {
        assert_eq!(
            RevisionSelector::select(&state(&[], false)),
            Selection::Skip(SkipReason::NoHistory)
        );
    }

    #[test]
    fn test_refine_changed_in_range() {
        assert_eq!(
            RevisionSelector::refine("v1.0", Some("main"), &commits(&["f3", "f2", "f1"]), &commits(&["f2", "f1"])),
            pair(Some("v1.0"), Some("main"), false)
        );
    }

    #[test]
    fn test_refine_created_in_range() {
        assert_eq!(
            RevisionSelector::refine("v1.0", Some("main"), &commits(&["f1"]), &[]),
            pair(None, Some("main"), true)
        );
    }

    #[test]
    fn test_refine_untouched_since_from() {
        assert_eq!(
            RevisionSelector::refine("v1.0", Some("main"), &commits(&["f2", "f1"]), &commits(&["f2", "f1"])),
            Selection::Skip(SkipReason::UntouchedSince("v1.0".to_string()))
        );
    }

    #[test]
    fn test_refine_missing_at_to() {
        assert_eq!(
            RevisionSelector::refine("v1.0", Some("main"), &[], &commits(&["f1"])),
            Selection::Skip(SkipReason::NoHistory)
        );
    }

    #[test]
    fn test_refine_against_working_tree() {
        assert_eq!(
            RevisionSelector::refine("v1.0", None, &commits(&["f2"]), &commits(&["f2"])),
            pair(Some("v1.0"), None, false)
        );
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(format!("{}", SkipReason::NoHistory), "no history");
        assert_eq!(
            format!("{}", SkipReason::UntouchedSince("abc".to_string())),
            "unchanged since abc"
        );
    }
}
