//! Test utilities and mocks for buildrig unit tests.
//!
//! [`MockRunner`] stands in for the host when a test needs to drive the
//! lifecycle or toolchain discovery without real compilers installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use buildrig::test_support::{CommandPattern, MockProcessOutput, MockRunner};
//!
//! #[test]
//! fn test_example() {
//!     let mut runner = MockRunner::new();
//!     runner.expect(
//!         CommandPattern::StartsWith("cmake --build".into()),
//!         MockProcessOutput::failure(2, "error: boom"),
//!     );
//!     runner.set_default(MockProcessOutput::success(""));
//!
//!     // Use the runner in tests...
//! }
//! ```

pub mod fixtures;

use anyhow::{bail, Result};

use crate::util::process::{CommandOutput, CommandRunner, CommandSpec};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create an output with both stdout and stderr.
    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    fn to_command_output(&self) -> CommandOutput {
        CommandOutput {
            status: Some(self.status),
            output: format!("{}{}", self.stdout, self.stderr),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in [`MockRunner`].
///
/// Matched against [`CommandSpec::display_command`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// What a matched expectation does.
#[derive(Debug, Clone)]
enum Reply {
    Output(MockProcessOutput),
    LaunchFailure,
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
struct CommandExpectation {
    pattern: CommandPattern,
    reply: Reply,
    times: Option<usize>,
    used: usize,
}

impl CommandExpectation {
    fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

/// Scripted [`CommandRunner`].
///
/// Expectations are tried in the order they were added; the first available
/// match wins. Commands matching nothing fail to launch unless a default
/// output is set.
#[derive(Debug, Default)]
pub struct MockRunner {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    specs: Vec<CommandSpec>,
    default_output: Option<MockProcessOutput>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Reply with `output` to every command matching `pattern`.
    pub fn expect(&mut self, pattern: CommandPattern, output: MockProcessOutput) -> &mut Self {
        self.push(pattern, Reply::Output(output), None)
    }

    /// Reply with `output` to at most `times` matching commands.
    pub fn expect_times(
        &mut self,
        pattern: CommandPattern,
        output: MockProcessOutput,
        times: usize,
    ) -> &mut Self {
        self.push(pattern, Reply::Output(output), Some(times))
    }

    /// Refuse to launch commands matching `pattern`.
    pub fn expect_launch_failure(&mut self, pattern: CommandPattern) -> &mut Self {
        self.push(pattern, Reply::LaunchFailure, None)
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// Every command run so far, as displayed.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Every command run so far, with environment and working directory.
    pub fn specs(&self) -> &[CommandSpec] {
        &self.specs
    }

    /// Index of the first call starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls.iter().position(|c| c.starts_with(prefix))
    }

    fn push(&mut self, pattern: CommandPattern, reply: Reply, times: Option<usize>) -> &mut Self {
        self.expectations.push(CommandExpectation {
            pattern,
            reply,
            times,
            used: 0,
        });
        self
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, cmd: &CommandSpec) -> Result<CommandOutput> {
        let full_cmd = cmd.display_command();
        self.calls.push(full_cmd.clone());
        self.specs.push(cmd.clone());

        for exp in &mut self.expectations {
            if exp.pattern.matches(&full_cmd) && exp.available() {
                exp.used += 1;
                return match &exp.reply {
                    Reply::Output(output) => Ok(output.to_command_output()),
                    Reply::LaunchFailure => bail!("failed to spawn `{}`", cmd.program.display()),
                };
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.to_command_output());
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_matches_in_order() {
        let mut runner = MockRunner::new();
        runner.expect_times(
            CommandPattern::StartsWith("cmake".into()),
            MockProcessOutput::failure(1, "first"),
            1,
        );
        runner.expect(
            CommandPattern::StartsWith("cmake".into()),
            MockProcessOutput::success("second"),
        );

        let first = runner.run(&CommandSpec::new("cmake").arg("..")).unwrap();
        assert_eq!(first.status, Some(1));
        assert_eq!(first.output, "first");

        let second = runner.run(&CommandSpec::new("cmake").arg("..")).unwrap();
        assert!(second.success());
        assert_eq!(runner.calls(), &["cmake ..", "cmake .."]);
    }

    #[test]
    fn test_mock_runner_unexpected_and_launch_failure() {
        let mut runner = MockRunner::new();
        runner.expect_launch_failure(CommandPattern::Exact("ctest".into()));

        assert!(runner.run(&CommandSpec::new("ctest")).is_err());
        assert!(runner.run(&CommandSpec::new("unknown")).is_err());

        runner.set_default(MockProcessOutput::success(""));
        assert!(runner.run(&CommandSpec::new("unknown")).is_ok());
    }
}
