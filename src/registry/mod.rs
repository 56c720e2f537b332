//! Registry sources for release counts
//!
//! This module provides:
//! - HTTP client shared foundation with an optional response cache
//! - Composer `auth.json` credential loading
//! - npm Registry source
//! - Packagist (and private Composer repository) source

mod auth;
mod cache;
mod client;
mod npm;
mod packagist;

pub use auth::{CredentialStore, Credentials};
pub use cache::{ttl_from_cache_control, ResponseCache, DEFAULT_CACHE_TTL};
pub use client::HttpClient;
pub use npm::NpmSource;
pub use packagist::{MetadataUrl, PackagistSource};

use crate::diff::{compare_versions, is_dev_version};
use crate::domain::PackageManagerKind;
use crate::error::RegistryError;
use async_trait::async_trait;
use std::cmp::Ordering;

/// A release range lookup for one package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseQuery<'a> {
    /// Package name as it appears in the lockfile
    pub package: &'a str,
    /// Lower bound, exclusive
    pub from: &'a str,
    /// Upper bound, inclusive
    pub to: &'a str,
    /// Repository the package was installed from, when the lockfile says
    pub repository_url: Option<&'a str>,
}

/// Trait for registry release lookups
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Get the package manager this source handles
    fn kind(&self) -> PackageManagerKind;

    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Published versions `v` with `from < v <= to`, ascending
    async fn releases_between(&self, query: &ReleaseQuery<'_>) -> Result<Vec<String>, RegistryError>;
}

/// Create the release source for the given package manager
pub fn create_source(
    kind: PackageManagerKind,
    client: HttpClient,
    credentials: CredentialStore,
) -> Box<dyn ReleaseSource> {
    match kind {
        PackageManagerKind::Composer => Box::new(PackagistSource::new(client, credentials)),
        PackageManagerKind::Npm => Box::new(NpmSource::new(client)),
    }
}

/// Keep released versions inside `(from, to]`, sorted ascending
pub fn filter_releases<I>(versions: I, from: &str, to: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut releases: Vec<String> = versions
        .into_iter()
        .filter(|v| !is_dev_version(v))
        .filter(|v| {
            compare_versions(v, from) == Ordering::Greater
                && compare_versions(v, to) != Ordering::Greater
        })
        .collect();
    releases.sort_by(|a, b| compare_versions(a, b));
    releases.dedup();
    releases
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_filter_releases_range() {
        let all = versions(&["1.0.0", "1.1.0", "1.0.1", "2.0.0", "1.2.0-beta", "0.9.0"]);
        assert_eq!(
            filter_releases(all, "1.0.0", "1.2.0"),
            versions(&["1.0.1", "1.1.0", "1.2.0-beta"])
        );
    }

    #[test]
    fn test_filter_releases_includes_upper_bound() {
        let all = versions(&["4.17.15", "4.17.19", "4.17.20", "4.17.21", "5.0.0"]);
        assert_eq!(
            filter_releases(all, "4.17.15", "4.17.21"),
            versions(&["4.17.19", "4.17.20", "4.17.21"])
        );
    }

    #[test]
    fn test_filter_releases_drops_dev_versions() {
        let all = versions(&["dev-main", "1.x-dev", "1.0.1"]);
        assert_eq!(filter_releases(all, "1.0.0", "1.5.0"), versions(&["1.0.1"]));
    }

    #[test]
    fn test_filter_releases_empty_when_reversed() {
        let all = versions(&["1.0.0", "1.1.0"]);
        assert!(filter_releases(all, "1.1.0", "1.0.0").is_empty());
    }

    #[test]
    fn test_create_source_kinds() {
        let client = HttpClient::new().unwrap();
        let source = create_source(PackageManagerKind::Npm, client.clone(), CredentialStore::default());
        assert_eq!(source.kind(), PackageManagerKind::Npm);
        let source = create_source(PackageManagerKind::Composer, client, CredentialStore::default());
        assert_eq!(source.kind(), PackageManagerKind::Composer);
        assert_eq!(source.registry_name(), "Packagist");
    }
}
