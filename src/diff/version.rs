//! Version parsing and ordering
//!
//! Lockfiles carry npm semver strings and Composer's looser versions
//! (`v1.2.3`, `1.2.3.4`, `2.0.0-RC1`, `dev-main`). Both are normalized to up to
//! four numeric components plus an optional pre-release.

use regex::Regex;
use semver::Prerelease;
use std::cmp::Ordering;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[vV]?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?(?:-?([0-9A-Za-z][0-9A-Za-z.-]*))?(?:\+[0-9A-Za-z.-]+)?$",
    )
    .unwrap()
});

/// A version normalized to `major.minor.patch.build[-pre]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    components: [u64; 4],
    pre: Prerelease,
}

impl ParsedVersion {
    /// Parse a version string, returning None for branch names and garbage
    pub fn parse(version: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(version.trim())?;

        let mut components = [0u64; 4];
        for (idx, slot) in components.iter_mut().enumerate() {
            if let Some(m) = caps.get(idx + 1) {
                *slot = m.as_str().parse().ok()?;
            }
        }

        let pre = match caps.get(5) {
            Some(m) => Prerelease::new(m.as_str()).ok()?,
            None => Prerelease::EMPTY,
        };

        Some(Self { components, pre })
    }

    pub fn major(&self) -> u64 {
        self.components[0]
    }

    pub fn minor(&self) -> u64 {
        self.components[1]
    }

    pub fn patch(&self) -> u64 {
        self.components[2]
    }

    /// Returns true for pre-release versions
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // An empty pre-release sorts above any non-empty one
        self.components
            .cmp(&other.components)
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns true for branch-style versions (`dev-main`, `1.x-dev`)
pub fn is_dev_version(version: &str) -> bool {
    let lower = version.trim().to_ascii_lowercase();
    lower.starts_with("dev-") || lower.ends_with("-dev")
}

/// Total order over version strings
///
/// Parseable versions compare numerically with the raw strings as tiebreak,
/// an unparseable version sorts above every parseable one, and two
/// unparseable versions compare as plain strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (ParsedVersion::parse(a), ParsedVersion::parse(b)) {
        (Some(pa), Some(pb)) => pa.cmp(&pb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
