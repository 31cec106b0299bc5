//! Distribution package builder.
//!
//! This builder has its own lifecycle; the packaging tool controls the
//! directory layout and runs configure, build and test itself:
//!
//! 1. Unless resuming, recreate the scratch tree, snapshot the source tree as
//!    `<name>_<version>.orig.tar.gz`, unpack it and copy in the packaging
//!    metadata.
//! 2. Run `debuild` in the unpacked tree with `DEB_BUILD_OPTIONS` encoding
//!    the configuration, optimization and test settings.
//! 3. Translate any test results the packaging run left behind.

use std::path::{Path, PathBuf};

use crate::builder::lifecycle::{collect_results, run_logged, warn, REPORT_DIR};
use crate::core::configuration::Configuration;
use crate::core::error::BuildFailure;
use crate::core::outcome::BuildOutcome;
use crate::core::request::BuildRequest;
use crate::report;
use crate::util::archive;
use crate::util::fs::{copy_dir_all, dirs_containing, ensure_dir, remove_dir_all_if_exists};
use crate::util::log::Logger;
use crate::util::process::{CommandRunner, CommandSpec};
use crate::util::version_file::read_version;

/// Packaging metadata location, relative to the source root.
pub const DEFAULT_METADATA_DIR: &str = "build/packaging/debian";

/// Variables forwarded to the packaging tool when set in our environment.
pub const DEFAULT_FORWARD_ENV: &[&str] = &["BUILDRIG_SKIP_SLOW_TESTS"];

/// Scratch tree below the work root.
const SCRATCH_DIR: &str = "tmp";

/// The `DEB_BUILD_OPTIONS` value for one configuration.
pub fn build_options(config: Configuration, skip_tests: bool) -> String {
    let mut options = format!("config={}", config);
    if config.is_unoptimized() {
        options.push_str(" noopt");
    }
    if skip_tests {
        options.push_str(" nocheck");
    }
    options
}

pub struct DebianBuilder<'a> {
    request: &'a BuildRequest,
    runner: &'a mut dyn CommandRunner,
    log: Logger,
    name: Option<String>,
    metadata_dir: PathBuf,
    forward_env: Vec<String>,
}

impl<'a> DebianBuilder<'a> {
    pub fn new(request: &'a BuildRequest, runner: &'a mut dyn CommandRunner, log: Logger) -> Self {
        DebianBuilder {
            request,
            runner,
            log,
            name: None,
            metadata_dir: PathBuf::from(DEFAULT_METADATA_DIR),
            forward_env: DEFAULT_FORWARD_ENV.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Source package name; defaults to the source directory's name.
    pub fn package_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Packaging metadata directory, relative to the source root.
    pub fn metadata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.metadata_dir = dir.into();
        self
    }

    /// Forward these variables too, in addition to the defaults.
    pub fn forward_env(mut self, names: impl IntoIterator<Item = String>) -> Self {
        for name in names {
            if !self.forward_env.contains(&name) {
                self.forward_env.push(name);
            }
        }
        self
    }

    pub fn build(self) -> Result<BuildOutcome, BuildFailure> {
        let request = self.request;
        let config = match request.configs() {
            [config] => *config,
            configs => {
                return Err(BuildFailure::configuration(format!(
                    "distribution packaging builds exactly one configuration, got {}",
                    configs.len()
                )))
            }
        };

        let name = self.name.clone().unwrap_or_else(|| source_dir_name(&request.source_dir));
        let version = read_version(&request.source_dir)
            .map_err(|e| BuildFailure::configuration(format!("{:#}", e)))?;

        let scratch = request.work_dir.join(SCRATCH_DIR);
        let tree = scratch.join(format!("{}-{}", name, version));

        if request.resume {
            if !tree.is_dir() {
                return Err(BuildFailure::configuration(format!(
                    "nothing to resume: {} does not exist",
                    tree.display()
                )));
            }
            self.log.header(&format!("Resuming in {}", tree.display()));
        } else {
            self.prepare_tree(&name, &version, &scratch, &tree)?;
        }

        let mut outcome = BuildOutcome::new();
        self.log.header(&format!("Packaging {}", config));

        let mut cmd = CommandSpec::new("debuild").args(["--preserve-envvar", "PATH"]);
        for var in &self.forward_env {
            cmd = cmd.args(["--preserve-envvar", var.as_str()]);
        }
        cmd = cmd
            .args(["-us", "-uc"])
            .env("DEB_BUILD_OPTIONS", build_options(config, request.skip_tests))
            .cwd(&tree);
        for var in &self.forward_env {
            if let Ok(value) = std::env::var(var) {
                cmd = cmd.env(var.as_str(), value);
            }
        }

        let output = run_logged(
            self.runner,
            &self.log,
            &cmd,
            &format!("Build package {}", config),
            false,
        )?;

        if !request.skip_tests {
            let report_dir = request.work_dir.join(REPORT_DIR);
            let build_dirs = dirs_containing(&tree, Path::new("Testing/TAG"));
            let primary = build_dirs.first().cloned().unwrap_or_else(|| tree.clone());
            collect_results(
                &self.log,
                &mut outcome,
                config.as_str(),
                &primary,
                &report_dir,
                &output.output,
            );

            // The summary counts were taken above; extra test trees only get
            // their own report.
            for (n, dir) in build_dirs.iter().enumerate().skip(1) {
                let suite = format!("{}-{}", config, n + 1);
                match report::translate(dir, &suite, &report_dir, Some(&output.output)) {
                    Ok(t) => self.log.normal(&format!(
                        "Wrote {} test result(s) to {}",
                        t.tests,
                        t.path.display()
                    )),
                    Err(e) => warn(
                        &self.log,
                        &format!(
                            "Could not translate test results for {} in {}: {}",
                            suite,
                            dir.display(),
                            e
                        ),
                    ),
                }
            }
        }

        outcome.finish();
        self.log.normal(&outcome.summary());
        Ok(outcome)
    }

    /// Recreate the scratch tree and populate it from a source snapshot.
    fn prepare_tree(
        &self,
        name: &str,
        version: &str,
        scratch: &Path,
        tree: &Path,
    ) -> Result<(), BuildFailure> {
        let source = &self.request.source_dir;
        let metadata = source.join(&self.metadata_dir);
        if !metadata.is_dir() {
            return Err(BuildFailure::configuration(format!(
                "packaging metadata not found: {}",
                metadata.display()
            )));
        }

        self.log.header("Preparing source package");
        remove_dir_all_if_exists(scratch).map_err(BuildFailure::filesystem)?;
        ensure_dir(scratch).map_err(BuildFailure::filesystem)?;

        let archive_path = scratch.join(format!("{}_{}.orig.tar.gz", name, version));
        let prefix = format!("{}-{}", name, version);
        let work_dir = &self.request.work_dir;
        let files = archive::create_snapshot(source, &archive_path, &prefix, |p| {
            p == work_dir.as_path() || p == scratch
        })
        .map_err(BuildFailure::filesystem)?;
        self.log.normal(&format!(
            "Archived {} files into {}",
            files,
            archive_path.display()
        ));

        archive::extract(&archive_path, scratch).map_err(BuildFailure::filesystem)?;
        copy_dir_all(&metadata, &tree.join("debian")).map_err(BuildFailure::filesystem)?;
        Ok(())
    }
}

fn source_dir_name(source_dir: &Path) -> String {
    source_dir
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| source_dir.file_name())
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "source".to_string())
}
