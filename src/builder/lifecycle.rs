//! The per-configuration build lifecycle shared by the generator-driven
//! builders.
//!
//! For every requested configuration, in request order:
//!
//! ```text
//! Configuring -> Building -> [Testing] -> Installing | Staging
//! ```
//!
//! followed by a single optional `Packaging` phase that the variant drives
//! once every configuration has gone through its chain.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::generator::Generator;
use crate::builder::jobs::host_jobs;
use crate::builder::toolchain::ToolchainEnvironment;
use crate::core::configuration::Configuration;
use crate::core::error::BuildFailure;
use crate::core::outcome::BuildOutcome;
use crate::core::request::{BuildRequest, InstallMode};
use crate::report::{self, has_no_tests_marker, parse_summary};
use crate::util::fs::ensure_dir;
use crate::util::log::{LogTag, Logger};
use crate::util::process::{CommandOutput, CommandRunner, CommandSpec};

/// Install components staged into their own subtree, in order.
pub const STAGE_COMPONENTS: [&str; 4] = ["Runtime", "Tools", "Development", "TestSuite"];

/// Directory below the work root receiving the portable test reports.
pub const REPORT_DIR: &str = "test-reports";

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Configuring,
    Building,
    Testing,
    Installing,
    Staging,
    Packaging,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "Idle",
            Phase::Configuring => "Configuring",
            Phase::Building => "Building",
            Phase::Testing => "Testing",
            Phase::Installing => "Installing",
            Phase::Staging => "Staging",
            Phase::Packaging => "Packaging",
            Phase::Done => "Done",
        };
        f.write_str(s)
    }
}

/// Drives configure/build/test/install over the request's configurations.
pub struct BuilderBase<'a> {
    request: &'a BuildRequest,
    runner: &'a mut dyn CommandRunner,
    log: Logger,
    env: ToolchainEnvironment,
    generator: Generator,
    jobs: usize,
    phase: Phase,
    outcome: BuildOutcome,
}

impl<'a> BuilderBase<'a> {
    /// Create a lifecycle for `request`.
    ///
    /// The generator and job count come from the request when set and are
    /// detected on the host otherwise.
    pub fn new(request: &'a BuildRequest, runner: &'a mut dyn CommandRunner, log: Logger) -> Self {
        let generator = match &request.generator {
            Some(name) => Generator::from_name(name),
            None => Generator::detect(cfg!(windows)),
        };
        let jobs = request.jobs.unwrap_or_else(host_jobs).max(1);

        BuilderBase {
            request,
            runner,
            log,
            env: ToolchainEnvironment::empty(),
            generator,
            jobs,
            phase: Phase::Idle,
            outcome: BuildOutcome::new(),
        }
    }

    /// Overlay `env` on every command this lifecycle spawns.
    pub fn with_environment(mut self, env: ToolchainEnvironment) -> Self {
        self.env = env;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> &BuildOutcome {
        &self.outcome
    }

    pub fn request(&self) -> &BuildRequest {
        self.request
    }

    pub fn environment(&self) -> &ToolchainEnvironment {
        &self.env
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Working directory of one configuration.
    pub fn config_dir(&self, config: Configuration) -> PathBuf {
        self.request.work_dir.join(config.as_str())
    }

    /// Where the portable test reports are written.
    pub fn report_dir(&self) -> PathBuf {
        self.request.work_dir.join(REPORT_DIR)
    }

    /// Run the full chain for every requested configuration.
    ///
    /// The first fatal failure stops the loop; later configurations never
    /// start.
    pub fn build_all(&mut self) -> Result<(), BuildFailure> {
        self.log.header(&format!(
            "Building {} configuration(s) with {} ({} jobs)",
            self.request.configs().len(),
            self.generator.cmake_name(),
            self.jobs
        ));

        let request = self.request;
        for &config in request.configs() {
            self.build_config(config)?;
        }
        Ok(())
    }

    fn build_config(&mut self, config: Configuration) -> Result<(), BuildFailure> {
        let dir = self.config_dir(config);
        ensure_dir(&dir).map_err(BuildFailure::filesystem)?;

        self.enter(Phase::Configuring, Some(config));
        self.configure(config, &dir)?;

        if self.request.clean {
            self.clean(config, &dir)?;
        }

        self.enter(Phase::Building, Some(config));
        self.compile(config, &dir)?;

        if !self.request.skip_tests {
            self.enter(Phase::Testing, Some(config));
            self.test(config, &dir)?;
        }

        match self.request.install.clone() {
            InstallMode::Stage => {
                self.enter(Phase::Staging, Some(config));
                self.stage(config, &dir)?;
            }
            InstallMode::Default | InstallMode::Prefix(_) => {
                self.enter(Phase::Installing, Some(config));
                self.install(config, &dir)?;
            }
        }
        Ok(())
    }

    fn configure(&mut self, config: Configuration, dir: &Path) -> Result<(), BuildFailure> {
        let mut cmd = CommandSpec::new("cmake")
            .arg("-G")
            .arg(self.generator.cmake_name())
            .arg("-D")
            .arg(format!("CMAKE_BUILD_TYPE={}", config));
        if let InstallMode::Prefix(prefix) = &self.request.install {
            cmd = cmd
                .arg("-D")
                .arg(format!("CMAKE_INSTALL_PREFIX={}", prefix.display()));
        }
        let cmd = cmd.arg(&self.request.source_dir).cwd(dir);

        self.run_command(cmd, &format!("Configure {}", config), false)?;
        Ok(())
    }

    fn clean(&mut self, config: Configuration, dir: &Path) -> Result<(), BuildFailure> {
        let cmd = CommandSpec::new("cmake")
            .args(["--build", ".", "--config", config.as_str(), "--target", "clean"])
            .cwd(dir);
        self.run_command(cmd, &format!("Clean {}", config), true)?;
        Ok(())
    }

    fn compile(&mut self, config: Configuration, dir: &Path) -> Result<(), BuildFailure> {
        let cmd = self.build_tool(config, None).cwd(dir);
        self.run_command(cmd, &format!("Build {}", config), false)?;
        Ok(())
    }

    /// Run the test runner and translate its report.
    ///
    /// Test failures are expected here; only a runner that cannot be
    /// launched is fatal. Report problems are warnings.
    fn test(&mut self, config: Configuration, dir: &Path) -> Result<(), BuildFailure> {
        let cmd = CommandSpec::new("ctest")
            .args([
                "-T",
                "Test",
                "--no-compress-output",
                "--output-on-failure",
                "-C",
                config.as_str(),
            ])
            .cwd(dir);
        let output = self.run_command(cmd, &format!("Test {}", config), true)?;

        self.collect_results(config.as_str(), dir, &output.output);
        Ok(())
    }

    /// Translate the native report below `build_dir` and add the runner's
    /// summary counts to the outcome.
    pub fn collect_results(&mut self, suite: &str, build_dir: &Path, runner_output: &str) {
        let report_dir = self.report_dir();
        collect_results(
            &self.log,
            &mut self.outcome,
            suite,
            build_dir,
            &report_dir,
            runner_output,
        );
    }

    fn install(&mut self, config: Configuration, dir: &Path) -> Result<(), BuildFailure> {
        let cmd = self.build_tool(config, Some("install")).cwd(dir);
        self.run_command(cmd, &format!("Install {}", config), false)?;
        Ok(())
    }

    /// Install every component into its own subtree of the staging area.
    fn stage(&mut self, config: Configuration, dir: &Path) -> Result<(), BuildFailure> {
        let stage_dir = self.request.stage_dir();
        for component in STAGE_COMPONENTS {
            let cmd = CommandSpec::new("cmake")
                .arg("-D")
                .arg(format!("COMPONENT={}", component))
                .arg("-D")
                .arg(format!(
                    "CMAKE_INSTALL_PREFIX={}",
                    stage_dir.join(component).display()
                ))
                .arg("-D")
                .arg(format!("BUILD_TYPE={}", config))
                .args(["-P", "cmake_install.cmake"])
                .cwd(dir);
            self.run_command(cmd, &format!("Stage {} {}", component, config), false)?;
        }
        Ok(())
    }

    fn build_tool(&self, config: Configuration, target: Option<&str>) -> CommandSpec {
        let mut cmd = CommandSpec::new("cmake").args(["--build", ".", "--config", config.as_str()]);
        if let Some(target) = target {
            cmd = cmd.args(["--target", target]);
        }
        let parallel = self.generator.parallel_args(self.jobs);
        if !parallel.is_empty() {
            cmd = cmd.arg("--").args(parallel);
        }
        cmd
    }

    /// Mark the start of the single packaging step.
    pub fn begin_packaging(&mut self) {
        self.enter(Phase::Packaging, None);
    }

    /// End the run, returning the accumulated outcome.
    pub fn finish(mut self) -> BuildOutcome {
        self.enter(Phase::Done, None);
        self.outcome.finish();
        self.log.normal(&self.outcome.summary());
        self.outcome
    }

    /// Run one external command with the toolchain environment overlaid.
    pub fn run_command(
        &mut self,
        cmd: CommandSpec,
        description: &str,
        allow_fail: bool,
    ) -> Result<CommandOutput, BuildFailure> {
        let cmd = self.env.apply(cmd);
        run_logged(&mut *self.runner, &self.log, &cmd, description, allow_fail)
    }

    fn enter(&mut self, phase: Phase, config: Option<Configuration>) {
        tracing::debug!("{} -> {}", self.phase, phase);
        self.phase = phase;
        match config {
            Some(config) => self.log.header(&format!("{} {}", phase, config)),
            None => self.log.header(&phase.to_string()),
        }
    }
}

/// Run `cmd`, logging its description, invocation and output.
///
/// A command that cannot be launched is always fatal. A nonzero exit is fatal
/// unless `allow_fail` is set, in which case it is logged and the output
/// returned.
pub fn run_logged(
    runner: &mut dyn CommandRunner,
    log: &Logger,
    cmd: &CommandSpec,
    description: &str,
    allow_fail: bool,
) -> Result<CommandOutput, BuildFailure> {
    log.log(description, LogTag::CommandDescription);
    log.log(&cmd.display_command(), LogTag::Command);

    let output = runner.run(cmd).map_err(|source| BuildFailure::Launch {
        command: cmd.display_command(),
        source,
    })?;

    if !output.success() {
        if !allow_fail {
            return Err(BuildFailure::CommandFailed {
                command: cmd.display_command(),
                cwd: cmd.cwd_or_current(),
                status: output.status,
            });
        }
        warn(
            log,
            &format!(
                "`{}` exited with status {:?}; continuing",
                cmd.display_command(),
                output.status
            ),
        );
    }
    Ok(output)
}

/// Translate the native report below `build_dir` into `report_dir` and add
/// the runner's summary counts to `outcome`.
///
/// Nothing here is fatal: report problems are logged as warnings.
pub fn collect_results(
    log: &Logger,
    outcome: &mut BuildOutcome,
    suite: &str,
    build_dir: &Path,
    report_dir: &Path,
    runner_output: &str,
) {
    match report::translate(build_dir, suite, report_dir, Some(runner_output)) {
        Ok(translation) => log.normal(&format!(
            "Wrote {} test result(s) to {}",
            translation.tests,
            translation.path.display()
        )),
        Err(e) => warn(
            log,
            &format!("Could not translate test results for {}: {}", suite, e),
        ),
    }

    match parse_summary(runner_output) {
        Some(summary) => {
            log.normal(&format!(
                "{}: {} of {} tests failed",
                suite, summary.failed, summary.total
            ));
            outcome.record_tests(summary.total, summary.failed);
        }
        None if has_no_tests_marker(runner_output) => {
            log.normal(&format!("{}: no tests were found", suite));
        }
        None => warn(
            log,
            &format!("Could not find the test summary for {} in the test output", suite),
        ),
    }
}

/// Log a non-fatal problem to both `tracing` and the build log.
pub(crate) fn warn(log: &Logger, message: &str) {
    tracing::warn!("{}", message);
    log.log(&format!("warning: {}", message), LogTag::Detail);
}
