//! Preferring a 32-bit Java runtime for 32-bit builds.
//!
//! The Java bindings load the native library into the JVM, so a 32-bit build
//! needs a 32-bit `java` to run its tests. 64-bit installs commonly appear
//! earlier on PATH.

use std::path::{Path, PathBuf};

use crate::core::configuration::Architecture;
use crate::util::process::{CommandRunner, CommandSpec};

use super::ToolchainEnvironment;

const JAVA_NAMES: &[&str] = &["java.exe", "java"];

/// Return the first directory on `path_value` whose `java` the `probe`
/// reports as 32-bit.
pub fn find_32bit_runtime_dir<F>(path_value: &str, mut probe: F) -> Option<PathBuf>
where
    F: FnMut(&Path) -> Option<bool>,
{
    for dir in std::env::split_paths(path_value) {
        let Some(java) = JAVA_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
        else {
            continue;
        };

        if probe(&java) == Some(true) {
            return Some(dir);
        }
    }
    None
}

/// For 32-bit builds with Java enabled, put a 32-bit runtime first on the
/// environment's PATH. Returns the directory that was prepended.
pub fn prefer_32bit_java(
    env: &mut ToolchainEnvironment,
    runner: &mut dyn CommandRunner,
    arch: Architecture,
    java_enabled: bool,
) -> Option<PathBuf> {
    if !java_enabled || !arch.is_32_bit() {
        return None;
    }

    let path_value = env
        .get("PATH")
        .map(str::to_string)
        .or_else(|| std::env::var("PATH").ok())?;

    let dir = find_32bit_runtime_dir(&path_value, |java| {
        let output = runner
            .run(&CommandSpec::new(java).arg("-version"))
            .ok()?;
        Some(!output.output.contains("64-Bit"))
    })?;

    tracing::info!("Preferring 32-bit Java runtime in {}", dir.display());
    env.prepend_path(&dir);
    Some(dir)
}
