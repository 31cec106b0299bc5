//! `buildrig translate` command

use anyhow::{Context, Result};

use buildrig::report::{self, ReportError};

use crate::cli::TranslateArgs;

pub fn execute(args: TranslateArgs) -> Result<()> {
    let runner_output = args
        .runner_output
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read runner output: {}", path.display()))
        })
        .transpose()?;

    let out_dir = args.out.as_ref().unwrap_or(&args.build_dir);
    let translation = match report::translate(
        &args.build_dir,
        &args.suite,
        out_dir,
        runner_output.as_deref(),
    ) {
        Err(ReportError::NoTestCases { path }) => {
            tracing::warn!("The test report lists no tests");
            println!("Wrote {} (0 tests, 0 errors)", path.display());
            return Ok(());
        }
        result => result?,
    };

    if let Some(summary) = runner_output.as_deref().and_then(report::parse_summary) {
        println!("{} tests, {} failed", summary.total, summary.failed);
    }
    println!(
        "Wrote {} ({} tests, {} errors)",
        translation.path.display(),
        translation.tests,
        translation.errors
    );

    Ok(())
}
