//! Persisted user configuration
//!
//! Stored as TOML at `$XDG_CONFIG_HOME/lockdiff/config.toml`. Every key is
//! optional; command line flags take precedence over stored values.

use crate::error::ConfigError;
use crate::git::DEFAULT_GIT_TIMEOUT;
use crate::output::OutputFormat;
use crate::registry::DEFAULT_CACHE_TTL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Keys accepted by `config get/set/unset`
pub const KEYS: [&str; 6] = [
    "format",
    "no-cache",
    "no-progress",
    "cache-ttl",
    "git-timeout",
    "skip-release-count",
];

/// User configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Output format (text, json, markdown)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Disable the registry response cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<bool>,
    /// Disable the progress bar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_progress: Option<bool>,
    /// Default lifetime of cached responses, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<u64>,
    /// Time limit per git invocation, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_timeout: Option<u64>,
    /// Never query registries for release counts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_release_count: Option<bool>,
}

impl Config {
    /// Load configuration; a missing file is the default configuration
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, raw).map_err(write_error)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(format) = &self.format {
            format.parse::<OutputFormat>()?;
        }
        if self.git_timeout == Some(0) {
            return Err(ConfigError::invalid_value(
                "git-timeout",
                "0",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Stored value of a key, formatted as on the command line
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "format" => self.format.clone(),
            "no-cache" => self.no_cache.map(|v| v.to_string()),
            "no-progress" => self.no_progress.map(|v| v.to_string()),
            "cache-ttl" => self.cache_ttl.map(|v| v.to_string()),
            "git-timeout" => self.git_timeout.map(|v| v.to_string()),
            "skip-release-count" => self.skip_release_count.map(|v| v.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "format" => {
                let format: OutputFormat = value.parse()?;
                self.format = Some(format.label().to_string());
            }
            "no-cache" => self.no_cache = Some(parse_bool(key, value)?),
            "no-progress" => self.no_progress = Some(parse_bool(key, value)?),
            "cache-ttl" => self.cache_ttl = Some(parse_seconds(key, value, true)?),
            "git-timeout" => self.git_timeout = Some(parse_seconds(key, value, false)?),
            "skip-release-count" => self.skip_release_count = Some(parse_bool(key, value)?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Remove a key, returning whether it was set
    pub fn unset(&mut self, key: &str) -> Result<bool, ConfigError> {
        let was_set = self.get(key)?.is_some();
        match key {
            "format" => self.format = None,
            "no-cache" => self.no_cache = None,
            "no-progress" => self.no_progress = None,
            "cache-ttl" => self.cache_ttl = None,
            "git-timeout" => self.git_timeout = None,
            _ => self.skip_release_count = None,
        }
        Ok(was_set)
    }

    /// Every key with its stored value
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        KEYS.iter()
            .map(|key| (*key, self.get(key).ok().flatten()))
            .collect()
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        self.format.as_deref().and_then(|f| f.parse().ok())
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_TTL)
    }

    pub fn git_timeout(&self) -> Duration {
        self.git_timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GIT_TIMEOUT)
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::UnknownKey {
        key: key.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::invalid_value(key, value, "expected true or false")),
    }
}

fn parse_seconds(key: &str, value: &str, allow_zero: bool) -> Result<u64, ConfigError> {
    let seconds: u64 = value
        .trim()
        .strip_suffix('s')
        .unwrap_or(value.trim())
        .parse()
        .map_err(|_| ConfigError::invalid_value(key, value, "expected a number of seconds"))?;
    if seconds == 0 && !allow_zero {
        return Err(ConfigError::invalid_value(key, value, "must be greater than zero"));
    }
    Ok(seconds)
}

/// Returns the path of the configuration file
pub fn config_path() -> Result<PathBuf, ConfigError> {
    config_path_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::config_dir())
        .ok_or(ConfigError::DirectoryUnavailable {
            what: "configuration",
        })
}

fn config_path_with_env(xdg_config_home: Option<String>, config_dir: Option<PathBuf>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or(config_dir)
        .map(|dir| dir.join("lockdiff").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl(), DEFAULT_CACHE_TTL);
        assert_eq!(config.git_timeout(), DEFAULT_GIT_TIMEOUT);
    }

    #[test]
    fn test_set_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("format", "Markdown").unwrap();
        config.set("no-cache", "yes").unwrap();
        config.set("cache-ttl", "600s").unwrap();
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("format = \"markdown\""));
        assert!(raw.contains("no-cache = true"));
        assert!(!raw.contains("git-timeout"));

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.output_format(), Some(OutputFormat::Markdown));
        assert_eq!(loaded.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_get_unset_and_entries() {
        let mut config = Config::default();
        config.set("skip-release-count", "true").unwrap();
        assert_eq!(config.get("skip-release-count").unwrap().as_deref(), Some("true"));
        assert_eq!(config.get("git-timeout").unwrap(), None);

        let entries = config.entries();
        assert_eq!(entries.len(), KEYS.len());
        assert_eq!(entries[5], ("skip-release-count", Some("true".to_string())));

        assert!(config.unset("skip-release-count").unwrap());
        assert!(!config.unset("skip-release-count").unwrap());
    }

    #[test]
    fn test_invalid_keys_and_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("colour", "true"),
            Err(ConfigError::UnknownKey { .. })
        ));
        assert!(matches!(config.get("colour"), Err(ConfigError::UnknownKey { .. })));
        assert!(matches!(config.unset("colour"), Err(ConfigError::UnknownKey { .. })));
        assert!(matches!(
            config.set("no-cache", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("git-timeout", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("format", "yaml"),
            Err(ConfigError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "format = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));

        std::fs::write(&path, "format = \"yaml\"").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::InvalidFormat { .. })));
    }

    #[test]
    fn test_zero_git_timeout_in_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "git-timeout = 0\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidValue { .. })
        ));

        std::fs::write(&path, "git-timeout = 5\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().git_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_path_with_env() {
        assert_eq!(
            config_path_with_env(Some("/tmp/xdg".to_string()), Some(PathBuf::from("/home/u/.config"))),
            Some(PathBuf::from("/tmp/xdg/lockdiff/config.toml"))
        );
        assert_eq!(
            config_path_with_env(None, Some(PathBuf::from("/home/u/.config"))),
            Some(PathBuf::from("/home/u/.config/lockdiff/config.toml"))
        );
        assert_eq!(config_path_with_env(Some(String::new()), None), None);
    }
}
