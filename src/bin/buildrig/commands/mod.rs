//! Command implementations

pub mod build;
pub mod completions;
pub mod package;
pub mod toolchain;
pub mod translate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use buildrig::builder::{Action, BuilderVariant, PackageSettings, Platform};
use buildrig::util::config::{global_config_path, load_config, project_config_path, Config};
use buildrig::util::process::SystemRunner;
use buildrig::{BuildFailure, BuildOutcome, BuildRequest, Logger};

use crate::cli::RequestArgs;

/// Load the merged global and project configuration for `source`.
pub fn load_merged_config(source: &Path) -> Config {
    load_config(global_config_path().as_deref(), &project_config_path(source))
}

/// Build the request shared by `build` and `package`.
///
/// Command-line flags win over the config files.
pub fn base_request(args: &RequestArgs, config: &Config, verbose: bool) -> Result<BuildRequest> {
    let source = args
        .source
        .canonicalize()
        .with_context(|| format!("source directory not found: {}", args.source.display()))?;

    let mut request = BuildRequest::new(args.configs.iter().copied(), &source)
        .with_jobs(args.jobs.or(config.build.jobs))
        .with_generator(args.generator.clone().or_else(|| config.build.generator.clone()))
        .with_skip_tests(args.skip_tests)
        .with_verbosity(u8::from(verbose));

    if let Some(arch) = args.arch {
        request = request.with_arch(arch);
    }
    if let Some(dir) = args.work_dir.as_ref().or(config.build.work_dir.as_ref()) {
        request = request.with_work_dir(absolute(&source, dir));
    }

    Ok(request)
}

/// Open the build log for `request`.
pub fn open_log(args: &RequestArgs, config: &Config, request: &BuildRequest) -> Result<Logger> {
    let path = args
        .log_file
        .clone()
        .or_else(|| config.build.log_file.clone())
        .unwrap_or_else(|| request.work_dir.join("buildlog.txt"));
    Logger::with_file(&path)
}

/// Packaging settings from the config files.
pub fn package_settings(config: &Config) -> PackageSettings {
    PackageSettings {
        name: config.package.name.clone(),
        metadata_dir: config.package.metadata_dir.clone(),
        forward_env: config.package.forward_env.clone(),
    }
}

/// Select the builder for `action` on this host and run it over `request`.
pub fn run_builder(
    action: Action,
    request: &BuildRequest,
    log: Logger,
    settings: &PackageSettings,
    summary_json: Option<&Path>,
) -> Result<()> {
    let result = Platform::current()
        .and_then(|platform| BuilderVariant::select(platform, action))
        .and_then(|variant| {
            let mut runner = SystemRunner::new(log.clone());
            variant.run(request, &mut runner, log.clone(), settings)
        });
    finish(result, &log, summary_json)
}

/// Report the outcome of a run and close the log.
pub fn finish(
    result: Result<BuildOutcome, BuildFailure>,
    log: &Logger,
    summary_json: Option<&Path>,
) -> Result<()> {
    match result {
        Ok(outcome) => {
            if let Some(path) = summary_json {
                let json = serde_json::to_string_pretty(&outcome)?;
                std::fs::write(path, json)
                    .with_context(|| format!("failed to write summary: {}", path.display()))?;
            }
            log.close();
            Ok(())
        }
        Err(failure) => {
            log.header(&format!("Fatal error: {}", failure));
            log.close();
            Err(failure.into())
        }
    }
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
