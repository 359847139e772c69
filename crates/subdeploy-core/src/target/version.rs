//! Studio version parsing and patch bumping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// `major.minor.patch` triple embedded in a studio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudioVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl StudioVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl From<(u64, u64, u64)> for StudioVersion {
    fn from((major, minor, patch): (u64, u64, u64)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl fmt::Display for StudioVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for StudioVersion {
    type Err = String;

    /// Accepts a plain numeric triple only; pre-release and build suffixes are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version =
            semver::Version::parse(s).map_err(|e| format!("invalid version '{s}': {e}"))?;
        if !version.pre.is_empty() || !version.build.is_empty() {
            return Err(format!(
                "invalid version '{s}': expected major.minor.patch without suffixes"
            ));
        }
        if version.patch == u64::MAX {
            return Err(format!(
                "invalid version '{s}': patch component cannot be incremented"
            ));
        }
        Ok(Self::new(version.major, version.minor, version.patch))
    }
}

/// Version label passed to the deploy command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionLabel(String);

impl VersionLabel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for VersionLabel {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Next label for a studio deployment: patch + 1, major and minor unchanged.
///
/// There is no rollover, so `0.0.9` becomes `0.0.10`.
pub fn next_version(current: StudioVersion) -> VersionLabel {
    let patch = u128::from(current.patch) + 1;
    VersionLabel(format!("{}.{}.{}", current.major, current.minor, patch))
}
