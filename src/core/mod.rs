//! Core data model shared by every builder variant.

pub mod configuration;
pub mod error;
pub mod outcome;
pub mod request;

pub use configuration::{Architecture, Configuration};
pub use error::BuildFailure;
pub use outcome::BuildOutcome;
pub use request::{BuildRequest, InstallMode};
