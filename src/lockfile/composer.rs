//! composer.lock extractor
//!
//! Reads the `packages` and `packages-dev` arrays. Entries from
//! `packages-dev` win when a name appears in both.

use crate::domain::{NormalizedPackageMap, PackageManagerKind};
use crate::lockfile::VersionExtractor;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

static SECTIONS: [&str; 2] = ["packages", "packages-dev"];

/// Extractor for composer.lock files
pub struct ComposerLockExtractor;

impl ComposerLockExtractor {
    fn parse(content: &str) -> Option<serde_json::Map<String, Value>> {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(root)) => Some(root),
            Ok(_) => {
                debug!("composer.lock top level is not an object");
                None
            }
            Err(e) => {
                debug!("failed to parse composer.lock: {}", e);
                None
            }
        }
    }

    /// Iterates package objects of both sections in order
    fn packages(root: &serde_json::Map<String, Value>) -> impl Iterator<Item = &Value> {
        SECTIONS
            .iter()
            .filter_map(|section| root.get(*section).and_then(Value::as_array))
            .flatten()
    }
}

impl VersionExtractor for ComposerLockExtractor {
    fn extract(&self, content: &str) -> NormalizedPackageMap {
        let Some(root) = Self::parse(content) else {
            return NormalizedPackageMap::new();
        };

        let mut map = NormalizedPackageMap::new();
        for package in Self::packages(&root) {
            let name = package.get("name").and_then(Value::as_str);
            let version = package.get("version").and_then(Value::as_str);
            if let (Some(name), Some(version)) = (name, version) {
                map.insert(name.to_string(), version.to_string());
            }
        }
        map
    }

    fn repository_urls(&self, content: &str) -> HashMap<String, String> {
        let Some(root) = Self::parse(content) else {
            return HashMap::new();
        };

        Self::packages(&root)
            .filter_map(|package| {
                let name = package.get("name")?.as_str()?;
                let url = package.get("notification-url")?.as_str()?;
                Some((name.to_string(), url.to_string()))
            })
            .collect()
    }

    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Composer
    }
}
