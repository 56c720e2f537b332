//! Semantic version level of a version change

use super::version::{is_dev_version, ParsedVersion};
use crate::domain::SemverLevel;

/// Returns the coarsest component that differs between two versions
///
/// Branch versions, unparseable versions and changes that only touch the
/// pre-release or build metadata have no level. The result does not depend
/// on argument order.
pub fn classify(from: &str, to: &str) -> Option<SemverLevel> {
    if is_dev_version(from) || is_dev_version(to) {
        return None;
    }

    let from = ParsedVersion::parse(from)?;
    let to = ParsedVersion::parse(to)?;

    if from.major() != to.major() {
        Some(SemverLevel::Major)
    } else if from.minor() != to.minor() {
        Some(SemverLevel::Minor)
    } else if from.patch() != to.patch() {
        Some(SemverLevel::Patch)
    } else {
        None
    }
}
