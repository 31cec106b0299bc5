//! Fatal build failures.
//!
//! Every anticipated operational failure is funnelled into [`BuildFailure`].
//! The binary catches exactly this kind, logs it and exits nonzero; anything
//! else is treated as a defect.

use std::path::PathBuf;

use thiserror::Error;

/// The single distinguished fatal failure of a build run.
#[derive(Debug, Error)]
pub enum BuildFailure {
    /// Malformed or contradictory request, raised before any command runs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The compiler environment could not be located or captured.
    #[error("toolchain discovery failed: {0}")]
    ToolchainDiscovery(String),

    /// An external command exited nonzero at a call site that does not tolerate it.
    #[error("failed to run `{command}` in {} (exit status {})", cwd.display(), display_status(*status))]
    CommandFailed {
        command: String,
        cwd: PathBuf,
        status: Option<i32>,
    },

    /// An external command could not be started at all.
    #[error("could not launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// A filesystem step performed by the driver itself failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildFailure {
    /// Shorthand for a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        BuildFailure::Configuration(message.into())
    }

    /// Shorthand for a toolchain discovery error.
    pub fn discovery(message: impl Into<String>) -> Self {
        BuildFailure::ToolchainDiscovery(message.into())
    }

    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BuildFailure::Io {
            context: context.into(),
            source,
        }
    }

    /// Convert a failed filesystem helper into an [`BuildFailure::Io`].
    pub fn filesystem(err: anyhow::Error) -> Self {
        let context = err.to_string();
        let source = match err.downcast::<std::io::Error>() {
            Ok(source) => source,
            Err(other) => std::io::Error::other(format!("{:#}", other)),
        };
        BuildFailure::Io { context, source }
    }
}

fn display_status(status: Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = BuildFailure::CommandFailed {
            command: "cmake --build .".to_string(),
            cwd: PathBuf::from("/work/Debug"),
            status: Some(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("cmake --build ."));
        assert!(msg.contains("/work/Debug"));
        assert!(msg.contains("exit status 2"));
    }

    #[test]
    fn test_signal_status_message() {
        let err = BuildFailure::CommandFailed {
            command: "ctest".to_string(),
            cwd: PathBuf::from("."),
            status: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_filesystem_keeps_context() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("missing.txt");
        let err = crate::util::fs::read_to_string(&missing).unwrap_err();
        let failure = BuildFailure::filesystem(err);
        assert!(matches!(failure, BuildFailure::Io { .. }));
        assert!(failure.to_string().contains("missing.txt"));
    }
}
