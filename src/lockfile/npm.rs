//! package-lock.json extractor
//!
//! Handles:
//! - lockfileVersion 2/3: the flat `packages` object keyed by install path
//! - lockfileVersion 1: the nested `dependencies` tree
//!
//! Install paths lose every `node_modules/` segment, so
//! `node_modules/react/node_modules/scheduler` becomes `react/scheduler`.

use crate::domain::{NormalizedPackageMap, PackageManagerKind};
use crate::lockfile::VersionExtractor;
use serde_json::{Map, Value};
use tracing::debug;

const NODE_MODULES: &str = "node_modules/";

/// Extractor for package-lock.json files
pub struct NpmLockExtractor;

/// Converts an install path key into a package name
///
/// Returns an empty string for the root entry and for keys made only of
/// `node_modules/` segments.
pub fn package_name_from_path(key: &str) -> String {
    key.split(NODE_MODULES)
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl NpmLockExtractor {
    fn extract_packages(packages: &Map<String, Value>, map: &mut NormalizedPackageMap) {
        for (key, entry) in packages {
            let name = package_name_from_path(key);
            if name.is_empty() {
                continue;
            }
            match entry.get("version").and_then(Value::as_str) {
                Some(version) if !version.is_empty() => {
                    map.insert(name, version.to_string());
                }
                _ => {}
            }
        }
    }

    fn extract_dependencies(
        prefix: Option<&str>,
        dependencies: &Map<String, Value>,
        map: &mut NormalizedPackageMap,
    ) {
        for (name, entry) in dependencies {
            let full_name = match prefix {
                Some(parent) => format!("{}/{}", parent, name),
                None => name.clone(),
            };
            if let Some(version) = entry.get("version").and_then(Value::as_str) {
                if !version.is_empty() {
                    map.insert(full_name.clone(), version.to_string());
                }
            }
            if let Some(nested) = entry.get("dependencies").and_then(Value::as_object) {
                Self::extract_dependencies(Some(&full_name), nested, map);
            }
        }
    }
}

impl VersionExtractor for NpmLockExtractor {
    fn extract(&self, content: &str) -> NormalizedPackageMap {
        let root = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(root)) => root,
            Ok(_) => {
                debug!("package-lock.json top level is not an object");
                return NormalizedPackageMap::new();
            }
            Err(e) => {
                debug!("failed to parse package-lock.json: {}", e);
                return NormalizedPackageMap::new();
            }
        };

        let mut map = NormalizedPackageMap::new();
        if let Some(packages) = root.get("packages").and_then(Value::as_object) {
            Self::extract_packages(packages, &mut map);
        } else if let Some(dependencies) = root.get("dependencies").and_then(Value::as_object) {
            Self::extract_dependencies(None, dependencies, &mut map);
        }
        map
    }

    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Npm
    }
}
