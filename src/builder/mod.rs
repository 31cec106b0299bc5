//! Build drivers.
//!
//! Exactly one [`BuilderVariant`] is selected per run from the host platform
//! and the requested action, then driven once over the whole request.

pub mod debian;
pub mod generator;
pub mod jobs;
pub mod lifecycle;
pub mod native_ide;
pub mod toolchain;
pub mod unix;

use std::fmt;
use std::path::PathBuf;

use crate::core::error::BuildFailure;
use crate::core::outcome::BuildOutcome;
use crate::core::request::BuildRequest;
use crate::util::log::Logger;
use crate::util::process::CommandRunner;

pub use debian::DebianBuilder;
pub use generator::Generator;
pub use jobs::{estimate_jobs, host_jobs};
pub use lifecycle::{BuilderBase, Phase};
pub use native_ide::NativeIdeBuilder;
pub use toolchain::{ToolchainEnvironment, ToolchainLocator};
pub use unix::UnixBuilder;

/// Operating system family, as far as building is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// The IDE compiler platform.
    Windows,
    /// Unix with the distribution packaging tools.
    Linux,
    /// Any other Unix.
    Unix,
}

impl Platform {
    pub fn current() -> Result<Self, BuildFailure> {
        if cfg!(windows) {
            Ok(Platform::Windows)
        } else if cfg!(target_os = "linux") {
            Ok(Platform::Linux)
        } else if cfg!(unix) {
            Ok(Platform::Unix)
        } else {
            Err(BuildFailure::configuration(format!(
                "unsupported operating system: {}",
                std::env::consts::OS
            )))
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Build,
    Package,
}

/// Distribution packaging settings from the config files.
#[derive(Debug, Clone, Default)]
pub struct PackageSettings {
    pub name: Option<String>,
    pub metadata_dir: Option<PathBuf>,
    pub forward_env: Vec<String>,
}

/// The closed set of builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderVariant {
    NativeIde,
    Unix,
    Debian,
}

impl fmt::Display for BuilderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuilderVariant::NativeIde => "native IDE",
            BuilderVariant::Unix => "unix",
            BuilderVariant::Debian => "debian",
        };
        f.write_str(s)
    }
}

impl BuilderVariant {
    /// Pick the builder for `action` on `platform`.
    pub fn select(platform: Platform, action: Action) -> Result<Self, BuildFailure> {
        match (platform, action) {
            (Platform::Windows, Action::Build) => Ok(BuilderVariant::NativeIde),
            (Platform::Linux | Platform::Unix, Action::Build) => Ok(BuilderVariant::Unix),
            (Platform::Linux, Action::Package) => Ok(BuilderVariant::Debian),
            (_, Action::Package) => Err(BuildFailure::configuration(
                "distribution packaging is only supported on Linux; use `build --package` for the installer",
            )),
        }
    }

    /// Validate `request` and run the selected builder once.
    pub fn run(
        self,
        request: &BuildRequest,
        runner: &mut dyn CommandRunner,
        log: Logger,
        package: &PackageSettings,
    ) -> Result<BuildOutcome, BuildFailure> {
        request.validate()?;
        tracing::debug!("Using the {} builder", self);

        match self {
            BuilderVariant::NativeIde => NativeIdeBuilder::new(request, runner, log).build(),
            BuilderVariant::Unix => UnixBuilder::new(request, runner, log).build(),
            BuilderVariant::Debian => {
                let mut builder = DebianBuilder::new(request, runner, log)
                    .package_name(package.name.clone())
                    .forward_env(package.forward_env.iter().cloned());
                if let Some(dir) = &package.metadata_dir {
                    builder = builder.metadata_dir(dir);
                }
                builder.build()
            }
        }
    }
}
