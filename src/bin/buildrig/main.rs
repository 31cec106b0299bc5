//! buildrig CLI - cross-platform build driver

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use buildrig::BuildFailure;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("buildrig=debug")
    } else {
        EnvFilter::new("buildrig=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match run(cli) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<BuildFailure>() {
            // Anticipated operational failure: already in the build log.
            Some(failure) => {
                tracing::error!("{}", failure);
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, verbose),
        Commands::Package(args) => commands::package::execute(args, verbose),
        Commands::Translate(args) => commands::translate::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
