//! Compiler environment discovery.
//!
//! On the IDE platform the compiler only works inside the environment its
//! setup script (`vcvarsall.bat`) establishes. Discovery finds the best
//! installed suite, runs that script, and captures the variables it sets into
//! a [`ToolchainEnvironment`] that is then overlaid on every command the
//! build spawns.
//!
//! Discovery order:
//! 1. The installer query tool (`vswhere.exe`)
//! 2. The legacy installation registry key
//! 3. Fail: no usable toolchain

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use crate::core::error::BuildFailure;
use crate::util::process::CommandSpec;

mod detect;
mod runtime;
mod version;

pub use detect::{find_vswhere, parse_registry_listing, parse_vswhere_json, ToolchainLocator};
pub use runtime::{find_32bit_runtime_dir, prefer_32bit_java};
pub use version::{select_best, Candidate, ToolchainVersion};

/// Variables that must all be produced by the setup script.
pub const REQUIRED_VARS: &[&str] = &["INCLUDE", "LIB", "LIBPATH", "PATH", "VCINSTALLDIR"];

/// Variables merged when present.
pub const OPTIONAL_VARS: &[&str] = &[
    "VSINSTALLDIR",
    "VCTOOLSINSTALLDIR",
    "WINDOWSSDKDIR",
    "WINDOWSSDKVERSION",
    "UCRTVERSION",
    "UNIVERSALCRTSDKDIR",
    "FRAMEWORKDIR",
    "FRAMEWORKVERSION",
    "VISUALSTUDIOVERSION",
];

/// Map a toolchain nickname to the toolset version understood by the setup
/// script's `-vcvars_ver` switch.
pub fn toolset_version(nickname: &str) -> Result<&'static str, BuildFailure> {
    match nickname.to_lowercase().as_str() {
        "vs2015" => Ok("14.0"),
        "vs2017" => Ok("14.1"),
        "vs2019" => Ok("14.2"),
        "vs2022" => Ok("14.3"),
        other => Err(BuildFailure::configuration(format!(
            "unknown toolchain '{}'; expected vs2015, vs2017, vs2019 or vs2022",
            other
        ))),
    }
}

/// Map a toolchain nickname to the product major version recorded by the
/// legacy registry listing (`14.0` is vs2015, `15.0` is vs2017).
pub fn product_major(nickname: &str) -> Result<u32, BuildFailure> {
    match nickname.to_lowercase().as_str() {
        "vs2015" => Ok(14),
        "vs2017" => Ok(15),
        "vs2019" => Ok(16),
        "vs2022" => Ok(17),
        other => Err(BuildFailure::configuration(format!(
            "unknown toolchain '{}'; expected vs2015, vs2017, vs2019 or vs2022",
            other
        ))),
    }
}

/// Captured compiler environment plus where it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainEnvironment {
    vars: BTreeMap<String, String>,
    provenance: String,
}

impl ToolchainEnvironment {
    /// An environment that adds nothing (platforms without a setup script).
    pub fn empty() -> Self {
        ToolchainEnvironment::default()
    }

    /// Build from a `NAME=VALUE` dump of the post-setup environment.
    ///
    /// Only required and optional variables are kept. The dump only overrides
    /// what it actually produced, and a missing required variable fails the
    /// whole discovery.
    pub fn from_dump(dump: &str, provenance: impl Into<String>) -> Result<Self, BuildFailure> {
        let provenance = provenance.into();
        let found = parse_environment_dump(dump);

        let mut vars = BTreeMap::new();
        for name in REQUIRED_VARS.iter().chain(OPTIONAL_VARS) {
            let Some(value) = found.get(*name) else {
                continue;
            };
            let previous = std::env::var(name).ok();
            tracing::debug!(
                "{}: discovered {:?}, previously {:?}",
                name,
                value,
                previous
            );
            vars.insert(name.to_string(), value.clone());
        }

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| !vars.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(BuildFailure::discovery(format!(
                "the environment set up by {} is missing {}",
                provenance,
                missing.join(", ")
            )));
        }

        Ok(ToolchainEnvironment { vars, provenance })
    }

    /// Which toolchain supplied the variables.
    pub fn provenance(&self) -> &str {
        &self.provenance
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_uppercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Put `dir` in front of the captured `PATH`.
    pub fn prepend_path(&mut self, dir: &Path) {
        let current = self
            .vars
            .get("PATH")
            .cloned()
            .or_else(|| std::env::var("PATH").ok())
            .unwrap_or_default();

        let mut entries: Vec<OsString> = vec![dir.as_os_str().to_os_string()];
        entries.extend(std::env::split_paths(&current).map(|p| p.into_os_string()));
        if let Ok(joined) = std::env::join_paths(entries) {
            self.vars
                .insert("PATH".to_string(), joined.to_string_lossy().into_owned());
        }
    }

    /// Overlay the captured variables on a command.
    pub fn apply(&self, cmd: CommandSpec) -> CommandSpec {
        cmd.envs(self.iter())
    }
}

/// Parse `NAME=VALUE` lines, uppercasing names and stripping one trailing
/// path separator from values.
pub fn parse_environment_dump(dump: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for line in dump.lines() {
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim_end_matches('\r');
        let value = value
            .strip_suffix('\\')
            .or_else(|| value.strip_suffix('/'))
            .unwrap_or(value);
        vars.insert(name.to_uppercase(), value.to_string());
    }
    vars
}
