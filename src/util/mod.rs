//! Shared utilities

pub mod archive;
pub mod config;
pub mod fs;
pub mod log;
pub mod process;
pub mod version_file;

pub use config::Config;
pub use log::{LogTag, Logger};
pub use process::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
