//! Package map diffing
//!
//! This module provides:
//! - `compute_diff`: classified, name-ordered changes between two package maps
//! - `compare_versions`: the total order used to tell updates from downgrades
//! - `classify`: major/minor/patch level of a version change

mod classify;
mod version;

pub use classify::classify;
pub use version::{compare_versions, is_dev_version, ParsedVersion};

use crate::domain::{NormalizedPackageMap, PackageChange, PackageManagerKind};
use std::cmp::Ordering;

/// Compute the changes from `previous` to `current`
///
/// Unchanged packages are dropped. The result is sorted by package name in
/// byte order, independent of map iteration order.
pub fn compute_diff(
    previous: &NormalizedPackageMap,
    current: &NormalizedPackageMap,
    kind: PackageManagerKind,
) -> Vec<PackageChange> {
    let mut changes = Vec::new();

    for (name, from) in previous {
        match current.get(name) {
            None => changes.push(PackageChange::removed(name, kind, from)),
            Some(to) if to == from => {}
            Some(to) => {
                let upgraded = compare_versions(to, from) == Ordering::Greater;
                changes.push(PackageChange::changed(name, kind, from, to, upgraded));
            }
        }
    }

    for (name, to) in current {
        if !previous.contains_key(name) {
            changes.push(PackageChange::added(name, kind, to));
        }
    }

    changes.sort_by(|a, b| a.name.cmp(&b.name));
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChangeStatus;

    fn map(entries: &[(&str, &str)]) -> NormalizedPackageMap {
        entries
            .iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect()
    }

    #[test]
    fn test_scenario_added_removed_updated() {
        let previous = map(&[("a", "1.0.0"), ("b", "2.0.0")]);
        let current = map(&[("a", "1.1.0"), ("c", "1.0.0")]);

        let changes = compute_diff(&previous, &current, PackageManagerKind::Composer);

        let rows: Vec<_> = changes
            .iter()
            .map(|c| (c.name.as_str(), c.status, c.from.as_deref(), c.to.as_deref()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("a", ChangeStatus::Updated, Some("1.0.0"), Some("1.1.0")),
                ("b", ChangeStatus::Removed, Some("2.0.0"), None),
                ("c", ChangeStatus::Added, None, Some("1.0.0")),
            ]
        );
    }

    #[test]
    fn test_npm_scenario_with_downgrade() {
        let previous = map(&[("lodash", "4.17.15"), ("moment", "2.29.1"), ("axios", "0.21.1")]);
        let current = map(&[("lodash", "4.17.21"), ("axios", "0.20.0"), ("react", "18.2.0")]);

        let changes = compute_diff(&previous, &current, PackageManagerKind::Npm);
        let names: Vec<_> = changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["axios", "lodash", "moment", "react"]);

        let status = |name: &str| changes.iter().find(|c| c.name == name).unwrap().status;
        assert_eq!(status("axios"), ChangeStatus::Downgraded);
        assert_eq!(status("lodash"), ChangeStatus::Updated);
        assert_eq!(status("moment"), ChangeStatus::Removed);
        assert_eq!(status("react"), ChangeStatus::Added);
        assert!(changes.iter().all(|c| c.kind == PackageManagerKind::Npm));
    }

    #[test]
    fn test_identical_maps_are_empty() {
        let m = map(&[("a", "1.0.0"), ("b", "dev-main"), ("c", "whatever")]);
        assert!(compute_diff(&m, &m, PackageManagerKind::Npm).is_empty());
    }

    #[test]
    fn test_empty_sides() {
        let m = map(&[("a", "1.0.0"), ("b", "2.0.0")]);
        let empty = NormalizedPackageMap::new();

        let added = compute_diff(&empty, &m, PackageManagerKind::Npm);
        assert!(added.iter().all(|c| c.status == ChangeStatus::Added));
        assert_eq!(added.len(), 2);

        let removed = compute_diff(&m, &empty, PackageManagerKind::Npm);
        assert!(removed.iter().all(|c| c.status == ChangeStatus::Removed));
        assert_eq!(removed.len(), 2);

        assert!(compute_diff(&empty, &empty, PackageManagerKind::Npm).is_empty());
    }

    #[test]
    fn test_every_changed_name_appears_once() {
        let previous = map(&[("a", "1"), ("b", "1"), ("c", "1"), ("d", "1")]);
        let current = map(&[("b", "1"), ("c", "2"), ("d", "0.9"), ("e", "1")]);

        let changes = compute_diff(&previous, &current, PackageManagerKind::Composer);
        let names: Vec<_> = changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d", "e"]);
        for change in &changes {
            match change.status {
                ChangeStatus::Added => assert!(change.from.is_none() && change.to.is_some()),
                ChangeStatus::Removed => assert!(change.to.is_none() && change.from.is_some()),
                _ => assert!(change.from.is_some() && change.to.is_some()),
            }
            assert_ne!(change.from, change.to);
        }
    }

    #[test]
    fn test_order_is_stable_across_insertion_order() {
        let names = ["zeta", "Alpha", "beta", "@scope/x", "alpha", "beta-2"];
        let forward: NormalizedPackageMap =
            names.iter().map(|n| (n.to_string(), "1.0.0".to_string())).collect();
        let backward: NormalizedPackageMap = names
            .iter()
            .rev()
            .map(|n| (n.to_string(), "1.0.0".to_string()))
            .collect();
        let empty = NormalizedPackageMap::new();

        let a = compute_diff(&empty, &forward, PackageManagerKind::Npm);
        let b = compute_diff(&empty, &backward, PackageManagerKind::Npm);
        assert_eq!(a, b);
        let ordered: Vec<_> = a.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(ordered, vec!["@scope/x", "Alpha", "alpha", "beta", "beta-2", "zeta"]);
    }

    #[test]
    fn test_unparseable_versions_still_classified() {
        let previous = map(&[("a/a", "dev-main"), ("b/b", "1.0.0"), ("c/c", "dev-a")]);
        let current = map(&[("a/a", "1.0.0"), ("b/b", "dev-main"), ("c/c", "dev-b")]);

        let changes = compute_diff(&previous, &current, PackageManagerKind::Composer);
        assert_eq!(changes[0].status, ChangeStatus::Downgraded);
        assert_eq!(changes[1].status, ChangeStatus::Updated);
        assert_eq!(changes[2].status, ChangeStatus::Updated);
    }

    #[test]
    fn test_prefix_only_change_is_reported() {
        let previous = map(&[("a/a", "1.0.0")]);
        let current = map(&[("a/a", "v1.0.0")]);
        let changes = compute_diff(&previous, &current, PackageManagerKind::Composer);
        assert_eq!(changes.len(), 1);
        assert!(changes[0].status.is_version_change());
    }
}
