//! Application error types using thiserror
//!
//! Error hierarchy:
//! - GitError: Issues locating the repository or running git
//! - RegistryError: Issues with package registry communication
//! - ConfigError: Issues with CLI options and the configuration file
//! - CacheError: Issues with the on-disk response cache

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::PackageManagerKind;

/// Errors related to git
#[derive(Error, Debug)]
pub enum GitError {
    /// Directory is not inside a git working copy
    #[error("not a git repository: {path}")]
    NotARepository { path: PathBuf },

    /// The git executable could not be started
    #[error("failed to run git: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    /// A git command exceeded its time limit
    #[error("git {command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    /// A git command exited unsuccessfully
    #[error("git {command} failed: {message}")]
    CommandFailed { command: String, message: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },

    /// Authentication error
    #[error("authentication failed for {registry}: {message}")]
    AuthenticationError { registry: String, message: String },
}

/// Errors related to options and the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown package manager in --include/--exclude
    #[error("unknown package manager '{value}': expected 'composer' or 'npm'")]
    UnknownPackageManager { value: String },

    /// Unknown output format
    #[error("invalid format '{value}': expected 'text', 'json' or 'markdown'")]
    InvalidFormat { value: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },

    /// Unknown configuration key
    #[error("unknown configuration key '{key}'")]
    UnknownKey { key: String },

    /// Invalid value for a configuration key
    #[error("invalid value '{value}' for '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    /// Home or config directory could not be determined
    #[error("could not determine the {what} directory")]
    DirectoryUnavailable { what: &'static str },

    /// Failed to read configuration file
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write configuration file
    #[error("failed to write configuration {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file
    #[error("failed to parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Errors related to the response cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache file IO failed
    #[error("cache IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache entry could not be (de)serialized
    #[error("corrupt cache entry {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl GitError {
    /// Creates a new NotARepository error
    pub fn not_a_repository(path: impl Into<PathBuf>) -> Self {
        GitError::NotARepository { path: path.into() }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Returns the registry name for a package manager
    pub fn registry_name(kind: PackageManagerKind) -> &'static str {
        match kind {
            PackageManagerKind::Composer => "Packagist",
            PackageManagerKind::Npm => "npm",
        }
    }
}

impl ConfigError {
    /// Creates a new ConflictingOptions error
    pub fn conflicting(message: impl Into<String>) -> Self {
        ConfigError::ConflictingOptions {
            message: message.into(),
        }
    }

    /// Creates a new InvalidValue error
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}
