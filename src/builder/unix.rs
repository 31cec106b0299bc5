//! Builder for Unix-like hosts: the plain generator lifecycle, nothing else.

use crate::builder::lifecycle::BuilderBase;
use crate::core::error::BuildFailure;
use crate::core::outcome::BuildOutcome;
use crate::core::request::BuildRequest;
use crate::util::log::Logger;
use crate::util::process::CommandRunner;

/// Runs the shared lifecycle with the host's default environment.
pub struct UnixBuilder<'a> {
    request: &'a BuildRequest,
    runner: &'a mut dyn CommandRunner,
    log: Logger,
}

impl<'a> UnixBuilder<'a> {
    pub fn new(request: &'a BuildRequest, runner: &'a mut dyn CommandRunner, log: Logger) -> Self {
        UnixBuilder {
            request,
            runner,
            log,
        }
    }

    pub fn build(self) -> Result<BuildOutcome, BuildFailure> {
        if self.request.package {
            return Err(BuildFailure::configuration(
                "packaging on this platform is done with the `package` command",
            ));
        }

        let mut base = BuilderBase::new(self.request, self.runner, self.log);
        base.build_all()?;
        Ok(base.finish())
    }
}
