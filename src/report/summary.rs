//! Parsing of the test runner's textual summary line.

use regex::Regex;

/// Marker the test runner prints when the project defines no tests.
pub const NO_TESTS_MARKER: &str = "No tests were found";

/// Counts extracted from a line like `80% tests passed, 1 tests failed out of 5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: u64,
    pub failed: u64,
    pub total: u64,
}

const SUMMARY_PATTERN: &str =
    r"(\d+)%?\s+tests?\s+passed,\s+(\d+)\s+tests?\s+failed\s+out\s+of\s+(\d+)";

/// Extract the last summary line from the captured runner output.
pub fn parse_summary(output: &str) -> Option<TestSummary> {
    let re = Regex::new(SUMMARY_PATTERN).ok()?;
    let caps = re.captures_iter(output).last()?;
    let failed: u64 = caps[2].parse().ok()?;
    let total: u64 = caps[3].parse().ok()?;
    Some(TestSummary {
        passed: total.saturating_sub(failed),
        failed,
        total,
    })
}

/// Whether the runner reported that there was nothing to run.
pub fn has_no_tests_marker(output: &str) -> bool {
    output.contains(NO_TESTS_MARKER)
}
