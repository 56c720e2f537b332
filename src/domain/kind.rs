//! Package manager kinds whose lockfiles can be diffed

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    /// PHP ecosystem (composer.lock)
    Composer,
    /// Node.js ecosystem (package-lock.json)
    Npm,
}

impl PackageManagerKind {
    /// Returns the canonical label used in filters and JSON output
    pub fn label(&self) -> &'static str {
        match self {
            PackageManagerKind::Composer => "composer",
            PackageManagerKind::Npm => "npm",
        }
    }

    /// Returns the lockfile name for this package manager
    pub fn lockfile_name(&self) -> &'static str {
        match self {
            PackageManagerKind::Composer => "composer.lock",
            PackageManagerKind::Npm => "package-lock.json",
        }
    }

    /// Returns the registry base URL
    pub fn registry_base_url(&self) -> &'static str {
        match self {
            PackageManagerKind::Composer => "https://repo.packagist.org/p2",
            PackageManagerKind::Npm => "https://registry.npmjs.org",
        }
    }

    /// Returns the display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManagerKind::Composer => "Composer",
            PackageManagerKind::Npm => "npm",
        }
    }

    /// Returns all supported kinds in processing order
    pub fn all() -> &'static [PackageManagerKind] {
        &[PackageManagerKind::Composer, PackageManagerKind::Npm]
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PackageManagerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composer" => Ok(PackageManagerKind::Composer),
            "npm" => Ok(PackageManagerKind::Npm),
            _ => Err(ConfigError::UnknownPackageManager {
                value: s.to_string(),
            }),
        }
    }
}
