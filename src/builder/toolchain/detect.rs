//! Compiler suite discovery via `vswhere.exe` and the legacy registry key.

use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::core::configuration::Architecture;
use crate::core::error::BuildFailure;
use crate::util::log::Logger;
use crate::util::process::{CommandRunner, CommandSpec};

use super::version::{select_best, Candidate};
use super::{product_major, toolset_version, ToolchainEnvironment};

/// Oldest major version the legacy path accepts.
pub const MINIMUM_LEGACY_MAJOR: u32 = 14;

/// Registry keys listing legacy installations, tried in order.
const LEGACY_REGISTRY_KEYS: &[&str] = &[
    r"HKLM\SOFTWARE\WOW6432Node\Microsoft\VisualStudio\SxS\VS7",
    r"HKLM\SOFTWARE\Microsoft\VisualStudio\SxS\VS7",
];

/// Where a candidate was found; decides the setup script location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Discovery {
    Installer,
    Legacy,
}

/// One instance reported by `vswhere -format json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VsInstance {
    installation_path: PathBuf,
    installation_version: String,
}

/// Finds the best installed compiler suite and captures its environment.
pub struct ToolchainLocator<'a> {
    runner: &'a mut dyn CommandRunner,
    log: Logger,
    arch: Architecture,
    hint: Option<String>,
    vswhere: Option<PathBuf>,
    scratch_dir: PathBuf,
}

impl<'a> ToolchainLocator<'a> {
    /// Create a locator using the standard `vswhere.exe` location.
    pub fn new(runner: &'a mut dyn CommandRunner, log: Logger, arch: Architecture) -> Self {
        ToolchainLocator {
            runner,
            log,
            arch,
            hint: None,
            vswhere: find_vswhere(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Request a specific toolchain by nickname (e.g. `vs2019`).
    pub fn hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }

    /// Override the installer query tool location (`None` disables it).
    pub fn vswhere(mut self, vswhere: Option<PathBuf>) -> Self {
        self.vswhere = vswhere;
        self
    }

    /// Directory for the temporary capture script.
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Run discovery. Any failure aborts the build.
    pub fn locate(&mut self) -> Result<ToolchainEnvironment, BuildFailure> {
        let toolset = self.hint.as_deref().map(toolset_version).transpose()?;
        let product = self.hint.as_deref().map(product_major).transpose()?;

        let (candidate, discovery) = match self.query_installer()? {
            Some(candidate) => (candidate, Discovery::Installer),
            None => {
                tracing::debug!("Installer query found nothing, trying the legacy registry");
                let candidate = self.query_legacy(product)?.ok_or_else(|| match &self.hint {
                    Some(hint) => BuildFailure::discovery(format!(
                        "requested toolchain {} is not installed",
                        hint
                    )),
                    None => {
                        BuildFailure::discovery("could not find a supported compiler suite to use")
                    }
                })?;
                (candidate, Discovery::Legacy)
            }
        };

        let script = setup_script(&candidate.root, discovery);
        if !script.is_file() {
            return Err(BuildFailure::discovery(format!(
                "environment setup script not found: {}",
                script.display()
            )));
        }

        let provenance = format!("Visual Studio {}", candidate.version);
        self.log.normal(&format!(
            "Using {} at {}",
            provenance,
            candidate.root.display()
        ));

        let toolset_arg = match discovery {
            Discovery::Installer => toolset,
            Discovery::Legacy => None,
        };
        let dump = self.capture_environment(&script, toolset_arg)?;
        ToolchainEnvironment::from_dump(&dump, provenance)
    }

    /// Ask `vswhere.exe` for the latest suite with the C++ tools installed.
    fn query_installer(&mut self) -> Result<Option<Candidate>, BuildFailure> {
        let Some(vswhere) = self.vswhere.clone() else {
            return Ok(None);
        };

        let cmd = CommandSpec::new(&vswhere).args([
            "-latest",
            "-products",
            "*",
            "-requires",
            "Microsoft.VisualStudio.Component.VC.Tools.x86.x64",
            "-format",
            "json",
        ]);

        let output = match self.runner.run(&cmd) {
            Ok(out) if out.success() => out.output,
            Ok(out) => {
                tracing::debug!("vswhere failed with status {:?}", out.status);
                return Ok(None);
            }
            Err(e) => {
                tracing::debug!("Failed to run vswhere: {:#}", e);
                return Ok(None);
            }
        };

        Ok(parse_vswhere_json(&output)
            .into_iter()
            .filter(|c| c.root.is_dir())
            .max_by_key(|c| c.version))
    }

    /// Enumerate installations recorded in the legacy registry key, keeping
    /// only product major version `wanted` when given.
    fn query_legacy(&mut self, wanted: Option<u32>) -> Result<Option<Candidate>, BuildFailure> {
        for key in LEGACY_REGISTRY_KEYS {
            let cmd = CommandSpec::new("reg").args(["query", key]);
            let output = match self.runner.run(&cmd) {
                Ok(out) if out.success() => out.output,
                _ => continue,
            };

            let candidates: Vec<Candidate> = parse_registry_listing(&output)
                .into_iter()
                .filter(|c| wanted.map_or(true, |w| w == c.version.major))
                .collect();

            if let Some(best) = select_best(&candidates, MINIMUM_LEGACY_MAJOR, |p| p.is_dir()) {
                return Ok(Some(best));
            }
        }

        Ok(None)
    }

    /// Run the setup script and dump the resulting environment.
    fn capture_environment(
        &mut self,
        script: &Path,
        toolset: Option<&str>,
    ) -> Result<String, BuildFailure> {
        let mut call = format!("call \"{}\" {}", script.display(), self.arch.setup_script_arg());
        if let Some(toolset) = toolset {
            call.push_str(&format!(" -vcvars_ver={}", toolset));
        }
        let batch_content = format!(
            "@echo off\r\n{} >nul 2>&1\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
            call
        );

        // A batch file sidesteps cmd.exe quoting of the script path.
        let mut batch = tempfile::Builder::new()
            .prefix("buildrig_vcvars")
            .suffix(".bat")
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| BuildFailure::io("failed to create capture script", e))?;
        batch
            .write_all(batch_content.as_bytes())
            .and_then(|_| batch.flush())
            .map_err(|e| BuildFailure::io("failed to write capture script", e))?;

        let cmd = CommandSpec::new("cmd").arg("/c").arg(batch.path());
        let output = self.runner.run(&cmd).map_err(|e| {
            BuildFailure::discovery(format!("failed to run {}: {:#}", script.display(), e))
        })?;

        if !output.success() {
            return Err(BuildFailure::discovery(format!(
                "{} {} exited with status {:?}",
                script.display(),
                self.arch.setup_script_arg(),
                output.status
            )));
        }

        Ok(output.output)
    }
}

fn setup_script(root: &Path, discovery: Discovery) -> PathBuf {
    match discovery {
        Discovery::Installer => root
            .join("VC")
            .join("Auxiliary")
            .join("Build")
            .join("vcvarsall.bat"),
        Discovery::Legacy => root.join("VC").join("vcvarsall.bat"),
    }
}

/// Find vswhere.exe in its standard location or on PATH.
pub fn find_vswhere() -> Option<PathBuf> {
    let program_files_x86 = std::env::var("ProgramFiles(x86)")
        .unwrap_or_else(|_| "C:\\Program Files (x86)".to_string());

    let standard_path = PathBuf::from(&program_files_x86)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");

    if standard_path.exists() {
        return Some(standard_path);
    }

    which::which("vswhere").ok()
}

/// Parse `vswhere -format json` output into candidates.
pub fn parse_vswhere_json(output: &str) -> Vec<Candidate> {
    let instances: Vec<VsInstance> = match serde_json::from_str(output) {
        Ok(instances) => instances,
        Err(e) => {
            tracing::debug!("Unparseable vswhere output: {}", e);
            return Vec::new();
        }
    };

    instances
        .into_iter()
        .filter_map(|i| {
            let version = i.installation_version.parse().ok()?;
            Some(Candidate {
                version,
                root: i.installation_path,
            })
        })
        .collect()
}

/// Parse `reg query` output lines like `    14.0    REG_SZ    C:\Program Files (x86)\...\`.
pub fn parse_registry_listing(output: &str) -> Vec<Candidate> {
    let Ok(re) = Regex::new(r"^\s*(\S+)\s+REG_SZ\s+(.+?)\s*$") else {
        return Vec::new();
    };

    output
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| {
            let version = caps[1].parse().ok()?;
            Some(Candidate {
                version,
                root: PathBuf::from(&caps[2]),
            })
        })
        .collect()
}
