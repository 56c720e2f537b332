//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable connect/request timeouts and User-Agent
//! - Optional basic authentication per request
//! - An optional on-disk response cache
//!
//! Requests are not retried; a failed fetch is reported immediately.

use crate::error::RegistryError;
use crate::registry::auth::Credentials;
use crate::registry::cache::{ttl_from_cache_control, ResponseCache};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout (10 seconds)
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("lockdiff/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper with optional response caching
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    cache: Option<ResponseCache>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(
        timeout: Duration,
        connect_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RegistryError::NetworkError {
                package: String::new(),
                registry: "HTTP client".to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            cache: None,
        })
    }

    /// Attach a response cache
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Perform a GET request and return the body text
    ///
    /// Credentials never become part of the cache key.
    pub async fn get_text(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        package: &str,
        registry: &str,
    ) -> Result<String, RegistryError> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(url).await {
                return Ok(body);
            }
        }

        debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(credentials) = credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::timeout(package, registry)
            } else {
                RegistryError::network_error(package, registry, e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RegistryError::AuthenticationError {
                registry: registry.to_string(),
                message: format!("HTTP {} for '{}'", status, package),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::package_not_found(package, registry));
        }
        if !status.is_success() {
            return Err(RegistryError::network_error(
                package,
                registry,
                format!("HTTP {}", status),
            ));
        }

        let cache_control = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            RegistryError::invalid_response(
                package,
                registry,
                format!("failed to read response body: {}", e),
            )
        })?;

        if let Some(cache) = &self.cache {
            if let Some(ttl) = ttl_from_cache_control(cache_control.as_deref(), cache.default_ttl())
            {
                if let Err(e) = cache.put(url, &body, ttl).await {
                    warn!("failed to cache response for {}: {}", url, e);
                }
            }
        }

        Ok(body)
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let body = self.get_text(url, credentials, package, registry).await?;
        serde_json::from_str(&body).map_err(|e| {
            RegistryError::invalid_response(package, registry, format!("failed to parse JSON: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::cache::DEFAULT_CACHE_TTL;
    use mockito::Server;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert_eq!(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs(10));
        assert!(DEFAULT_USER_AGENT.starts_with("lockdiff/"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = Server::new_async().await;
        let _missing = server.mock("GET", "/missing").with_status(404).create_async().await;
        let _denied = server.mock("GET", "/denied").with_status(401).create_async().await;
        let _broken = server.mock("GET", "/broken").with_status(500).create_async().await;

        let client = HttpClient::new().unwrap();
        let url = |path: &str| format!("{}{}", server.url(), path);

        assert!(matches!(
            client.get_text(&url("/missing"), None, "pkg", "npm").await,
            Err(RegistryError::PackageNotFound { .. })
        ));
        assert!(matches!(
            client.get_text(&url("/denied"), None, "pkg", "npm").await,
            Err(RegistryError::AuthenticationError { .. })
        ));
        assert!(matches!(
            client.get_text(&url("/broken"), None, "pkg", "npm").await,
            Err(RegistryError::NetworkError { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/garbage")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let result: Result<serde_json::Value, _> = client
            .get_json(&format!("{}/garbage", server.url()), None, "pkg", "npm")
            .await;
        assert!(matches!(result, Err(RegistryError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_cached_response_skips_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/cached")
            .with_status(200)
            .with_header("cache-control", "max-age=600")
            .with_body("{\"hit\":1}")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = HttpClient::new()
            .unwrap()
            .with_cache(ResponseCache::new(dir.path(), DEFAULT_CACHE_TTL));
        let url = format!("{}/cached", server.url());

        let first = client.get_text(&url, None, "pkg", "npm").await.unwrap();
        let second = client.get_text(&url, None, "pkg", "npm").await.unwrap();

        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_basic_auth_header_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/private")
            .match_header("authorization", "Basic dXNlcjpzZWNyZXQ=")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let credentials = Credentials {
            username: "user".to_string(),
            password: "secret".to_string(),
        };
        let body = client
            .get_text(
                &format!("{}/private", server.url()),
                Some(&credentials),
                "pkg",
                "Packagist",
            )
            .await
            .unwrap();

        assert_eq!(body, "ok");
        mock.assert_async().await;
    }
}
