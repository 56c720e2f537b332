//! Package change rows produced by the diff engine

use super::PackageManagerKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a package changed between two lockfile revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Removed,
    Updated,
    Downgraded,
}

impl ChangeStatus {
    /// Returns the lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Removed => "removed",
            ChangeStatus::Updated => "updated",
            ChangeStatus::Downgraded => "downgraded",
        }
    }

    /// Returns true for statuses where both versions are known
    pub fn is_version_change(&self) -> bool {
        matches!(self, ChangeStatus::Updated | ChangeStatus::Downgraded)
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarsest semantic version component that differs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemverLevel {
    Major,
    Minor,
    Patch,
}

impl SemverLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SemverLevel::Major => "major",
            SemverLevel::Minor => "minor",
            SemverLevel::Patch => "patch",
        }
    }
}

impl fmt::Display for SemverLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a lockfile diff
///
/// Rows are only built through [`PackageChange::added`],
/// [`PackageChange::removed`] and [`PackageChange::changed`], so `from` is
/// `None` exactly for additions and `to` is `None` exactly for removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageChange {
    /// Package name
    pub name: String,
    /// Package manager the package belongs to
    pub kind: PackageManagerKind,
    /// Previous version (absent for additions)
    pub from: Option<String>,
    /// Current version (absent for removals)
    pub to: Option<String>,
    /// Change classification
    pub status: ChangeStatus,
    /// Number of releases between the two versions, when computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_count: Option<usize>,
    /// Semantic version level of an update or downgrade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<SemverLevel>,
}

impl PackageChange {
    /// Creates an Added row
    pub fn added(name: impl Into<String>, kind: PackageManagerKind, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            from: None,
            to: Some(to.into()),
            status: ChangeStatus::Added,
            release_count: None,
            semver: None,
        }
    }

    /// Creates a Removed row
    pub fn removed(
        name: impl Into<String>,
        kind: PackageManagerKind,
        from: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            from: Some(from.into()),
            to: None,
            status: ChangeStatus::Removed,
            release_count: None,
            semver: None,
        }
    }

    /// Creates an Updated or Downgraded row
    pub(crate) fn changed(
        name: impl Into<String>,
        kind: PackageManagerKind,
        from: impl Into<String>,
        to: impl Into<String>,
        upgraded: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            from: Some(from.into()),
            to: Some(to.into()),
            status: if upgraded {
                ChangeStatus::Updated
            } else {
                ChangeStatus::Downgraded
            },
            release_count: None,
            semver: None,
        }
    }

    /// Returns both versions for updates and downgrades
    pub fn versions(&self) -> Option<(&str, &str)> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) if self.status.is_version_change() => Some((from, to)),
            _ => None,
        }
    }
}

impl fmt::Display for PackageChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            ChangeStatus::Added => write!(
                f,
                "{}: added {}",
                self.name,
                self.to.as_deref().unwrap_or_default()
            ),
            ChangeStatus::Removed => write!(
                f,
                "{}: removed {}",
                self.name,
                self.from.as_deref().unwrap_or_default()
            ),
            _ => write!(
                f,
                "{}: {} → {}",
                self.name,
                self.from.as_deref().unwrap_or_default(),
                self.to.as_deref().unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_has_no_from() {
        let change = PackageChange::added("lodash", PackageManagerKind::Npm, "4.17.21");
        assert_eq!(change.status, ChangeStatus::Added);
        assert!(change.from.is_none());
        assert_eq!(change.to.as_deref(), Some("4.17.21"));
        assert!(change.versions().is_none());
    }

    #[test]
    fn test_removed_has_no_to() {
        let change = PackageChange::removed("moment", PackageManagerKind::Npm, "2.29.1");
        assert_eq!(change.status, ChangeStatus::Removed);
        assert!(change.to.is_none());
    }

    #[test]
    fn test_changed_direction() {
        let up = PackageChange::changed("a", PackageManagerKind::Composer, "1.0", "1.1", true);
        let down = PackageChange::changed("a", PackageManagerKind::Composer, "1.1", "1.0", false);
        assert_eq!(up.status, ChangeStatus::Updated);
        assert_eq!(down.status, ChangeStatus::Downgraded);
        assert_eq!(up.versions(), Some(("1.0", "1.1")));
    }

    #[test]
    fn test_display() {
        let change = PackageChange::changed("a", PackageManagerKind::Npm, "1.0.0", "2.0.0", true);
        assert_eq!(format!("{}", change), "a: 1.0.0 → 2.0.0");
        let change = PackageChange::added("b", PackageManagerKind::Npm, "1.0.0");
        assert_eq!(format!("{}", change), "b: added 1.0.0");
    }

    #[test]
    fn test_serialization_omits_absent_enrichment() {
        let change = PackageChange::added("b", PackageManagerKind::Npm, "1.0.0");
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["status"], "added");
        assert_eq!(json["kind"], "npm");
        assert!(json["from"].is_null());
        assert!(json.get("release_count").is_none());
        assert!(json.get("semver").is_none());
    }

    #[test]
    fn test_status_and_level_labels() {
        assert_eq!(ChangeStatus::Downgraded.label(), "downgraded");
        assert_eq!(format!("{}", SemverLevel::Minor), "minor");
        assert!(ChangeStatus::Updated.is_version_change());
        assert!(!ChangeStatus::Added.is_version_change());
    }
}
