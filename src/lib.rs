//! buildrig - a cross-platform build driver for CMake projects
//!
//! This crate drives external generators, compilers, test runners and
//! packaging tools through a uniform configure → build → test → install →
//! package lifecycle, and normalizes what comes out of them: job counts,
//! test totals and portable test reports.

pub mod builder;
pub mod core;
pub mod report;
pub mod util;

/// Test utilities and mocks for buildrig unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{Action, BuilderVariant, PackageSettings, Platform};
pub use core::{
    configuration::{Architecture, Configuration},
    error::BuildFailure,
    outcome::BuildOutcome,
    request::{BuildRequest, InstallMode},
};
pub use util::log::Logger;
