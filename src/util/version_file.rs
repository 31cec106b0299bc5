//! Project version lookup.
//!
//! The version lives in `VERSION.txt` at the source root as `KEY=VALUE` lines:
//!
//! ```text
//! MAJOR=6
//! MINOR=3
//! PATCH=0
//! SUFFIX=~beta1
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

pub const VERSION_FILE: &str = "VERSION.txt";

/// Read the `MAJOR.MINOR.PATCH[SUFFIX]` version string of the project at `source_dir`.
pub fn read_version(source_dir: &Path) -> Result<String> {
    let path = source_dir.join(VERSION_FILE);
    let contents = crate::util::fs::read_to_string(&path)?;
    parse_version(&contents).with_context(|| format!("malformed version file: {}", path.display()))
}

fn parse_version(contents: &str) -> Result<String> {
    let re = Regex::new(r"^\s*(MAJOR|MINOR|PATCH|SUFFIX)\s*=\s*(\S*)\s*$")?;

    let mut major = None;
    let mut minor = None;
    let mut patch = None;
    let mut suffix = String::new();

    for line in contents.lines() {
        if let Some(caps) = re.captures(line) {
            let value = caps[2].to_string();
            match &caps[1] {
                "MAJOR" => major = Some(value),
                "MINOR" => minor = Some(value),
                "PATCH" => patch = Some(value),
                _ => suffix = value,
            }
        }
    }

    match (major, minor, patch) {
        (Some(major), Some(minor), Some(patch)) => {
            Ok(format!("{}.{}.{}{}", major, minor, patch, suffix))
        }
        _ => anyhow::bail!("MAJOR, MINOR and PATCH must all be present"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_with_suffix() {
        let v = parse_version("MAJOR=6\nMINOR=3\nPATCH=0\nSUFFIX=~beta1\n").unwrap();
        assert_eq!(v, "6.3.0~beta1");
    }

    #[test]
    fn test_parse_version_without_suffix() {
        let v = parse_version("# comment\nMAJOR = 1\nMINOR=2\nPATCH=3\nSUFFIX=\n").unwrap();
        assert_eq!(v, "1.2.3");
    }

    #[test]
    fn test_parse_version_missing_patch() {
        assert!(parse_version("MAJOR=1\nMINOR=2\n").is_err());
    }
}
