//! Lockfile version extractors
//!
//! This module provides extractors that normalize lockfile contents into a
//! package name to version map for:
//! - Composer (composer.lock)
//! - npm (package-lock.json)
//!
//! Extraction never fails: unparseable content is an empty map.

mod composer;
mod npm;

pub use composer::ComposerLockExtractor;
pub use npm::NpmLockExtractor;

use crate::domain::{NormalizedPackageMap, PackageManagerKind};
use std::collections::HashMap;

/// Trait for extracting locked package versions from lockfile text
pub trait VersionExtractor: Send + Sync {
    /// Extract the package name to version mapping
    fn extract(&self, content: &str) -> NormalizedPackageMap;

    /// Package name to repository URL, for registries that serve several hosts
    fn repository_urls(&self, _content: &str) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Returns the package manager this extractor handles
    fn kind(&self) -> PackageManagerKind;
}

/// Get the extractor for the specified package manager
pub fn get_extractor(kind: PackageManagerKind) -> Box<dyn VersionExtractor> {
    match kind {
        PackageManagerKind::Composer => Box::new(ComposerLockExtractor),
        PackageManagerKind::Npm => Box::new(NpmLockExtractor),
    }
}
