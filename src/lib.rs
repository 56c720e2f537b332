//! lockdiff - lockfile change reporter library
//!
//! This library provides the core functionality for diffing dependency
//! lockfiles across git history:
//! - Composer (composer.lock)
//! - npm (package-lock.json)
//!
//! Changes are classified as added, removed, updated or downgraded and can be
//! enriched with a semver level and an upstream release count.

pub mod cli;
pub mod config;
pub mod diff;
pub mod domain;
pub mod error;
pub mod git;
pub mod lockfile;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod revision;
