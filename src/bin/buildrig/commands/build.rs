//! `buildrig build` command

use anyhow::Result;

use buildrig::builder::Action;
use buildrig::InstallMode;

use crate::cli::BuildArgs;

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let config = super::load_merged_config(&args.request.source);

    let install = match (&args.install, args.stage) {
        (Some(prefix), _) => InstallMode::Prefix(prefix.clone()),
        (None, true) => InstallMode::Stage,
        (None, false) => InstallMode::Default,
    };

    let request = super::base_request(&args.request, &config, verbose)?
        .with_toolchain_hint(args.studio.clone().or_else(|| config.toolchain.studio.clone()))
        .with_install(install)
        .with_package(args.package)
        .with_clean(args.clean)
        .with_java(args.java);

    let log = super::open_log(&args.request, &config, &request)?;
    super::run_builder(
        Action::Build,
        &request,
        log,
        &super::package_settings(&config),
        args.request.summary_json.as_deref(),
    )
}
