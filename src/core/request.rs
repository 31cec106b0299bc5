//! The immutable description of a build run.

use std::path::{Path, PathBuf};

use crate::core::configuration::{Architecture, Configuration};
use crate::core::error::BuildFailure;

/// Where build outputs go after a configuration has been built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMode {
    /// Run the install target with the generator's default prefix.
    Default,
    /// Install into a user-specified prefix.
    Prefix(PathBuf),
    /// Stage each install component into its own subtree of the staging area.
    Stage,
}

/// Everything the driver needs to know about one run.
///
/// Built once from CLI flags and config files, then only ever borrowed.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    configs: Vec<Configuration>,
    pub arch: Architecture,
    /// Toolchain nickname such as `vs2019`.
    pub toolchain_hint: Option<String>,
    pub install: InstallMode,
    pub skip_tests: bool,
    pub clean: bool,
    pub package: bool,
    /// Reuse a previous partial packaging attempt instead of starting clean.
    pub resume: bool,
    /// Whether the Java bindings are part of the build.
    pub java: bool,
    pub verbosity: u8,
    pub source_dir: PathBuf,
    pub work_dir: PathBuf,
    pub jobs: Option<usize>,
    pub generator: Option<String>,
}

impl BuildRequest {
    /// Create a request over the given configurations.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn new(configs: impl IntoIterator<Item = Configuration>, source_dir: impl AsRef<Path>) -> Self {
        let mut unique = Vec::new();
        for config in configs {
            if !unique.contains(&config) {
                unique.push(config);
            }
        }

        let source_dir = source_dir.as_ref().to_path_buf();
        BuildRequest {
            configs: unique,
            arch: Architecture::host(),
            toolchain_hint: None,
            install: InstallMode::Default,
            skip_tests: false,
            clean: false,
            package: false,
            resume: false,
            java: false,
            verbosity: 0,
            work_dir: source_dir.join("build-output"),
            source_dir,
            jobs: None,
            generator: None,
        }
    }

    pub fn with_arch(mut self, arch: Architecture) -> Self {
        self.arch = arch;
        self
    }

    pub fn with_toolchain_hint(mut self, hint: Option<String>) -> Self {
        self.toolchain_hint = hint;
        self
    }

    pub fn with_install(mut self, install: InstallMode) -> Self {
        self.install = install;
        self
    }

    pub fn with_skip_tests(mut self, skip: bool) -> Self {
        self.skip_tests = skip;
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Request packaging. Packaging always consumes the staging area.
    pub fn with_package(mut self, package: bool) -> Self {
        self.package = package;
        if package && !matches!(self.install, InstallMode::Prefix(_)) {
            self.install = InstallMode::Stage;
        }
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_java(mut self, java: bool) -> Self {
        self.java = java;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// The configurations in the order they were requested.
    pub fn configs(&self) -> &[Configuration] {
        &self.configs
    }

    /// Staging area root used by [`InstallMode::Stage`].
    pub fn stage_dir(&self) -> PathBuf {
        self.work_dir.join("stage")
    }

    /// Reject requests that cannot work on this host.
    pub fn validate(&self) -> Result<(), BuildFailure> {
        if self.configs.is_empty() {
            return Err(BuildFailure::configuration(
                "at least one configuration must be requested",
            ));
        }
        if self.arch == Architecture::X64 && Architecture::host() != Architecture::X64 {
            return Err(BuildFailure::configuration(
                "target x64 can't be built since this is not a 64 bit OS",
            ));
        }
        if self.package && matches!(self.install, InstallMode::Prefix(_)) {
            return Err(BuildFailure::configuration(
                "packaging needs the staging area and cannot be combined with --install",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configs_deduplicated_in_order() {
        let req = BuildRequest::new(
            [
                Configuration::Release,
                Configuration::Debug,
                Configuration::Release,
            ],
            "/src",
        );
        assert_eq!(req.configs(), &[Configuration::Release, Configuration::Debug]);
    }

    #[test]
    fn test_package_implies_staging() {
        let req = BuildRequest::new([Configuration::Release], "/src").with_package(true);
        assert_eq!(req.install, InstallMode::Stage);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let req = BuildRequest::new([], "/src");
        assert!(matches!(req.validate(), Err(BuildFailure::Configuration(_))));
    }

    #[test]
    fn test_package_with_prefix_is_rejected() {
        let req = BuildRequest::new([Configuration::Release], "/src")
            .with_install(InstallMode::Prefix(PathBuf::from("/opt/x")))
            .with_package(true);
        assert!(req.validate().is_err());
    }
}
