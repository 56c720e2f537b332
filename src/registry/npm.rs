//! npm Registry source
//!
//! Fetches package metadata from the npm registry.
//! API endpoint: https://registry.npmjs.org/{package}

use crate::domain::PackageManagerKind;
use crate::error::RegistryError;
use crate::registry::{filter_releases, HttpClient, ReleaseQuery, ReleaseSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// npm Registry source
pub struct NpmSource {
    client: HttpClient,
    base_url: String,
}

/// npm package metadata response
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
}

impl NpmSource {
    /// Create a new npm source against the public registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(PackageManagerKind::Npm.registry_base_url(), client)
    }

    /// Create a new npm source against another registry
    pub fn with_base_url(base_url: &str, client: HttpClient) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, encode_package_name(package))
    }
}

/// Registry name for a lockfile name
///
/// Nested installs are named `parent/child` in lockfile maps; the registry
/// only knows the last package, which may itself be scoped.
pub fn registry_package_name(name: &str) -> &str {
    let segments: Vec<&str> = name.split('/').collect();
    let n = segments.len();
    if n >= 2 && segments[n - 2].starts_with('@') {
        let start = name.len() - segments[n - 1].len() - segments[n - 2].len() - 1;
        &name[start..]
    } else {
        segments[n - 1]
    }
}

/// Encode package name for URL (handles scoped packages)
fn encode_package_name(package: &str) -> String {
    if package.starts_with('@') {
        package.replace('/', "%2F")
    } else {
        package.to_string()
    }
}

#[async_trait]
impl ReleaseSource for NpmSource {
    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Npm
    }

    fn registry_name(&self) -> &'static str {
        "npm"
    }

    async fn releases_between(&self, query: &ReleaseQuery<'_>) -> Result<Vec<String>, RegistryError> {
        let package = registry_package_name(query.package);
        let url = self.build_url(package);
        let response: NpmPackageResponse = self
            .client
            .get_json(&url, None, package, self.registry_name())
            .await?;

        Ok(filter_releases(
            response.versions.into_keys(),
            query.from,
            query.to,
        ))
    }
}
