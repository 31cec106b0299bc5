//! Builder for the IDE compiler platform.
//!
//! The compiler only works inside the environment its setup script creates,
//! so discovery runs once before any configuration is processed and the
//! captured variables are overlaid on every command that follows. Packaging
//! builds an installer from the staged components.

use std::path::PathBuf;

use crate::builder::lifecycle::BuilderBase;
use crate::builder::toolchain::{find_vswhere, prefer_32bit_java, ToolchainLocator};
use crate::core::error::BuildFailure;
use crate::core::outcome::BuildOutcome;
use crate::core::request::BuildRequest;
use crate::util::log::Logger;
use crate::util::process::{CommandRunner, CommandSpec};

/// Installer script, relative to the source root.
pub const INSTALLER_SCRIPT: &str = "build/packaging/windows/installer.nsi";

pub struct NativeIdeBuilder<'a> {
    request: &'a BuildRequest,
    runner: &'a mut dyn CommandRunner,
    log: Logger,
    vswhere: Option<PathBuf>,
    scratch_dir: PathBuf,
}

impl<'a> NativeIdeBuilder<'a> {
    pub fn new(request: &'a BuildRequest, runner: &'a mut dyn CommandRunner, log: Logger) -> Self {
        NativeIdeBuilder {
            request,
            runner,
            log,
            vswhere: find_vswhere(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Override the installer query tool used for discovery.
    pub fn vswhere(mut self, vswhere: Option<PathBuf>) -> Self {
        self.vswhere = vswhere;
        self
    }

    /// Directory for discovery's temporary files.
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn build(self) -> Result<BuildOutcome, BuildFailure> {
        let request = self.request;
        let installer = request.source_dir.join(INSTALLER_SCRIPT);
        if request.package && !installer.is_file() {
            return Err(BuildFailure::configuration(format!(
                "installer script not found: {}",
                installer.display()
            )));
        }

        self.log.header("Locating toolchain");
        let mut env = ToolchainLocator::new(&mut *self.runner, self.log.clone(), request.arch)
            .hint(request.toolchain_hint.clone())
            .vswhere(self.vswhere)
            .scratch_dir(&self.scratch_dir)
            .locate()?;
        prefer_32bit_java(&mut env, &mut *self.runner, request.arch, request.java);

        let studio = request
            .toolchain_hint
            .clone()
            .unwrap_or_else(|| env.provenance().to_string());

        let mut base = BuilderBase::new(request, self.runner, self.log).with_environment(env);
        base.build_all()?;

        if request.package {
            base.begin_packaging();
            let cmd = CommandSpec::new("makensis")
                .arg(format!("/DARCH={}", request.arch))
                .arg(format!("/DSTUDIO={}", studio))
                .arg(format!("/DSTAGE={}", request.stage_dir().display()))
                .arg(&installer)
                .cwd(&request.source_dir);
            base.run_command(cmd, "Build installer", false)?;
        }

        Ok(base.finish())
    }
}
