//! `buildrig toolchain` command

use anyhow::Result;

use buildrig::builder::ToolchainLocator;
use buildrig::util::process::SystemRunner;
use buildrig::{Architecture, Logger};

use crate::cli::ToolchainArgs;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    if !cfg!(windows) {
        println!("No compiler suite environment is needed on this platform.");
        return Ok(());
    }

    let log = Logger::new();
    let mut runner = SystemRunner::new(log.clone());
    let arch = args.arch.unwrap_or_else(Architecture::host);

    let env = ToolchainLocator::new(&mut runner, log, arch)
        .hint(args.studio)
        .locate()?;

    println!("Toolchain: {}", env.provenance());
    println!("Target:    {}", arch);
    println!();
    for (name, value) in env.iter() {
        println!("{}={}", name, value);
    }

    Ok(())
}
