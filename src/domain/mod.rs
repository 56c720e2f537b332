//! Core domain models for lockdiff
//!
//! This module contains the fundamental types used throughout the application:
//! - Package manager kinds and their lockfiles
//! - Package change rows with status and semver level
//! - Per-lockfile git state and diff results

mod change;
mod kind;
mod result;

pub use change::{ChangeStatus, PackageChange, SemverLevel};
pub use kind::PackageManagerKind;
pub use result::{DependencyDiff, DependencyFileState, DiffResult, UnchangedLockfile};

use std::collections::HashMap;

/// Package name to version mapping extracted from a lockfile
pub type NormalizedPackageMap = HashMap<String, String>;
