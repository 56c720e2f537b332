//! Packagist Registry source
//!
//! Fetches package metadata from Packagist or from the private Composer
//! repository a package was installed from.
//! API endpoint: https://repo.packagist.org/p2/{vendor}/{package}.json

use crate::domain::PackageManagerKind;
use crate::error::RegistryError;
use crate::registry::{filter_releases, CredentialStore, Credentials, HttpClient, ReleaseQuery, ReleaseSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Hosts that belong to the public Packagist service
const PUBLIC_HOSTS: [&str; 2] = ["packagist.org", "repo.packagist.org"];

/// Packagist Registry source
pub struct PackagistSource {
    client: HttpClient,
    credentials: CredentialStore,
    base_url: String,
}

/// Resolved metadata location for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUrl {
    pub url: String,
    pub credentials: Option<Credentials>,
}

/// Packagist p2 metadata response
#[derive(Debug, Deserialize)]
struct PackagistResponse {
    #[serde(default)]
    packages: HashMap<String, Vec<PackagistVersion>>,
}

#[derive(Debug, Deserialize)]
struct PackagistVersion {
    version: Option<String>,
}

impl PackagistSource {
    /// Create a new Packagist source
    pub fn new(client: HttpClient, credentials: CredentialStore) -> Self {
        Self::with_base_url(PackageManagerKind::Composer.registry_base_url(), client, credentials)
    }

    /// Create a new source whose public metadata lives under `base_url`
    pub fn with_base_url(base_url: &str, client: HttpClient, credentials: CredentialStore) -> Self {
        Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Metadata URL and credentials for a package
    ///
    /// A `notification-url` on a non-Packagist host points at a private
    /// repository serving the same `p2` layout.
    pub fn metadata_url(&self, package: &str, repository_url: Option<&str>) -> MetadataUrl {
        if let Some(origin) = repository_url.and_then(Origin::parse) {
            if !PUBLIC_HOSTS.contains(&origin.host.as_str()) {
                return MetadataUrl {
                    url: format!("{}://{}/p2/{}.json", origin.scheme, origin.authority, package),
                    credentials: self.credentials.for_host(&origin.host).cloned(),
                };
            }
        }

        MetadataUrl {
            url: format!("{}/{}.json", self.base_url, package),
            credentials: None,
        }
    }
}

/// Scheme and host parts of a repository URL
#[derive(Debug, PartialEq, Eq)]
struct Origin {
    scheme: String,
    /// Host with port, without userinfo
    authority: String,
    /// Host alone, lowercased
    host: String,
}

impl Origin {
    fn parse(url: &str) -> Option<Self> {
        let (scheme, rest) = url.split_once("://")?;
        let authority = rest.split(['/', '?', '#']).next()?;
        let authority = authority.rsplit_once('@').map_or(authority, |(_, a)| a);
        let host = match authority.rsplit_once(':') {
            Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
            _ => authority,
        };
        if host.is_empty() {
            return None;
        }
        Some(Self {
            scheme: scheme.to_ascii_lowercase(),
            authority: authority.to_string(),
            host: host.to_ascii_lowercase(),
        })
    }
}

#[async_trait]
impl ReleaseSource for PackagistSource {
    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Composer
    }

    fn registry_name(&self) -> &'static str {
        "Packagist"
    }

    async fn releases_between(&self, query: &ReleaseQuery<'_>) -> Result<Vec<String>, RegistryError> {
        let target = self.metadata_url(query.package, query.repository_url);
        let mut response: PackagistResponse = self
            .client
            .get_json(
                &target.url,
                target.credentials.as_ref(),
                query.package,
                self.registry_name(),
            )
            .await?;

        let entries = response.packages.remove(query.package).ok_or_else(|| {
            RegistryError::invalid_response(
                query.package,
                self.registry_name(),
                "package missing from metadata",
            )
        })?;

        Ok(filter_releases(
            entries.into_iter().filter_map(|entry| entry.version),
            query.from,
            query.to,
        ))
    }
}
