//! Toolchain version numbers and best-version selection.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A `major.minor` compiler-suite version. Further components are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToolchainVersion {
    pub major: u32,
    pub minor: u32,
}

impl ToolchainVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        ToolchainVersion { major, minor }
    }
}

impl Ord for ToolchainVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor).cmp(&(other.major, other.minor))
    }
}

impl PartialOrd for ToolchainVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ToolchainVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("empty version '{}'", s))?
            .parse::<u32>()
            .map_err(|_| format!("invalid version '{}'", s))?;
        let minor = match parts.next() {
            Some(p) => p
                .parse::<u32>()
                .map_err(|_| format!("invalid version '{}'", s))?,
            None => 0,
        };
        Ok(ToolchainVersion { major, minor })
    }
}

/// An installed toolchain as reported by an enumeration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub version: ToolchainVersion,
    pub root: PathBuf,
}

/// The highest version at or above `minimum_major` whose root passes `exists`.
///
/// `exists` is the only side effect; pass a closure over a fixed set to test
/// this without touching the disk.
pub fn select_best<'a, I, F>(candidates: I, minimum_major: u32, exists: F) -> Option<Candidate>
where
    I: IntoIterator<Item = &'a Candidate>,
    F: Fn(&Path) -> bool,
{
    candidates
        .into_iter()
        .filter(|c| c.version.major >= minimum_major)
        .filter(|c| exists(&c.root))
        .max_by_key(|c| c.version)
        .cloned()
}
