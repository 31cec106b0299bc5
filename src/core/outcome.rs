//! Accumulated result of a build run.

use serde::Serialize;

/// Test totals across every configuration plus the terminal flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    pub tests_total: u64,
    pub tests_failed: u64,
    pub success: bool,
}

impl BuildOutcome {
    pub fn new() -> Self {
        BuildOutcome::default()
    }

    /// Add the counts from one configuration's test phase.
    pub fn record_tests(&mut self, total: u64, failed: u64) {
        self.tests_total += total;
        self.tests_failed += failed;
    }

    pub fn tests_passed(&self) -> u64 {
        self.tests_total.saturating_sub(self.tests_failed)
    }

    /// Mark the run as having completed without a fatal error.
    pub fn finish(&mut self) {
        self.success = true;
    }

    /// One-line summary for the end of the log.
    pub fn summary(&self) -> String {
        format!(
            "{} tests executed, {} passed, {} failed",
            self.tests_total,
            self.tests_passed(),
            self.tests_failed
        )
    }
}
