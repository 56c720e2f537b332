//! On-disk cache for registry responses
//!
//! Entries are JSON files keyed by request URL. Lifetimes come from the
//! response's `Cache-Control` header or the configured default. Several
//! processes may share the directory: writes go through a temporary file and
//! a rename, and any unreadable entry is a miss.

use crate::error::CacheError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default lifetime of a cached response (1 hour)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Longest file stem derived from a URL
const MAX_KEY_LEN: usize = 180;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    expires_at: DateTime<Utc>,
    body: String,
}

/// Response cache rooted at a directory
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, default_ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            default_ttl,
        }
    }

    /// Returns `$XDG_CACHE_HOME/lockdiff/http` or the platform equivalent
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("lockdiff").join("http"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_key(url)))
    }

    /// Returns the cached body for `url` if present and fresh
    pub async fn get(&self, url: &str) -> Option<String> {
        let path = self.entry_path(url);
        let raw = tokio::fs::read_to_string(&path).await.ok()?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("ignoring corrupt cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if entry.url != url || entry.expires_at <= Utc::now() {
            return None;
        }
        debug!("cache hit for {}", url);
        Some(entry.body)
    }

    /// Stores `body` for `url` for the given lifetime
    pub async fn put(&self, url: &str, body: &str, ttl: Duration) -> Result<(), CacheError> {
        let Ok(ttl) = TimeDelta::from_std(ttl) else {
            return Ok(());
        };
        let entry = CacheEntry {
            url: url.to_string(),
            expires_at: Utc::now() + ttl,
            body: body.to_string(),
        };
        let path = self.entry_path(url);
        let serialized = serde_json::to_string(&entry).map_err(|e| CacheError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let tmp = path.with_extension(format!("{}.tmp", std::process::id()));
        tokio::fs::write(&tmp, serialized)
            .await
            .map_err(|source| CacheError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| CacheError::Io { path, source })
    }
}

/// Lifetime for a response given its `Cache-Control` header
///
/// Returns None when the response must not be stored.
pub fn ttl_from_cache_control(header: Option<&str>, default: Duration) -> Option<Duration> {
    let Some(header) = header else {
        return Some(default);
    };

    let mut max_age = None;
    for directive in header.split(',').map(|d| d.trim().to_ascii_lowercase()) {
        if directive == "no-store" || directive == "no-cache" || directive == "private" {
            return None;
        }
        if let Some(value) = directive.strip_prefix("max-age=") {
            max_age = value.trim_matches('"').parse::<u64>().ok();
        }
    }

    match max_age {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(default),
    }
}

/// File stem for a URL
fn file_key(url: &str) -> String {
    let mut key: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if key.len() > MAX_KEY_LEN {
        let tail = key.split_off(MAX_KEY_LEN);
        key.push_str(&format!("_{}", tail.len()));
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_from_cache_control() {
        let default = Duration::from_secs(60);
        assert_eq!(ttl_from_cache_control(None, default), Some(default));
        assert_eq!(
            ttl_from_cache_control(Some("public, max-age=300"), default),
            Some(Duration::from_secs(300))
        );
        assert_eq!(ttl_from_cache_control(Some("public"), default), Some(default));
        assert_eq!(ttl_from_cache_control(Some("no-store"), default), None);
        assert_eq!(ttl_from_cache_control(Some("max-age=0"), default), None);
    }

    #[test]
    fn test_file_key_is_filesystem_safe() {
        let key = file_key("https://registry.npmjs.org/@types%2Fnode");
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        let long = format!("https://example.test/{}", "a".repeat(400));
        assert!(file_key(&long).len() < MAX_KEY_LEN + 10);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("http"), DEFAULT_CACHE_TTL);

        assert!(cache.get("https://example.test/a").await.is_none());
        cache
            .put("https://example.test/a", "{\"ok\":true}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("https://example.test/a").await.as_deref(),
            Some("{\"ok\":true}")
        );
        assert!(cache.get("https://example.test/b").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), DEFAULT_CACHE_TTL);
        let url = "https://example.test/expired";
        let entry = CacheEntry {
            url: url.to_string(),
            expires_at: Utc::now() - TimeDelta::seconds(5),
            body: "old".to_string(),
        };
        std::fs::write(cache.entry_path(url), serde_json::to_string(&entry).unwrap()).unwrap();

        assert!(cache.get(url).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), DEFAULT_CACHE_TTL);
        let url = "https://example.test/corrupt";
        std::fs::write(cache.entry_path(url), "not json").unwrap();

        assert!(cache.get(url).await.is_none());
    }
}
