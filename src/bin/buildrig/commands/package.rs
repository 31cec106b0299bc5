//! `buildrig package` command

use anyhow::Result;

use buildrig::builder::Action;

use crate::cli::PackageArgs;

pub fn execute(args: PackageArgs, verbose: bool) -> Result<()> {
    let config = super::load_merged_config(&args.request.source);

    let request = super::base_request(&args.request, &config, verbose)?.with_resume(args.resume);

    let mut settings = super::package_settings(&config);
    if args.name.is_some() {
        settings.name = args.name.clone();
    }

    let log = super::open_log(&args.request, &config, &request)?;
    super::run_builder(
        Action::Package,
        &request,
        log,
        &settings,
        args.request.summary_json.as_deref(),
    )
}
