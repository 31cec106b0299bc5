//! Test result translation.
//!
//! Converts the native test runner's structured report into a portable
//! per-suite document, and extracts the pass/fail totals from the runner's
//! textual summary. Problems here are never fatal to a build; callers log
//! [`ReportError`] as a warning and carry on.

pub mod ctest;
pub mod junit;
pub mod summary;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use ctest::{TestRecord, TestStatus};
pub use summary::{has_no_tests_marker, parse_summary, TestSummary};

/// Reasons a native report could not be translated.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not read current-run marker {}: {source}", path.display())]
    MissingTag {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("test run directory {} does not exist", path.display())]
    MissingRunDirectory { path: PathBuf },

    #[error("could not read test report {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed test report{}: {message}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    Malformed {
        path: Option<PathBuf>,
        message: String,
    },

    /// The report listed no tests although the runner never said it found none.
    /// The empty suite has still been written to `path`.
    #[error("test report lists no tests; wrote an empty suite to {}", path.display())]
    NoTestCases { path: PathBuf },

    #[error("could not write portable report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A written portable report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub path: PathBuf,
    pub tests: usize,
    pub errors: usize,
}

/// File name of the portable report for `suite`.
pub fn report_file_name(suite: &str) -> String {
    format!("{}.junit.xml", suite)
}

/// Translate the native report below `build_dir/Testing` into
/// `out_dir/<suite>.junit.xml`.
///
/// `runner_output` is the captured text of the test runner. When it carries
/// the "no tests were found" marker, a missing native report yields an empty
/// suite instead of an error. A report with no entries and no marker is still
/// written, but comes back as [`ReportError::NoTestCases`].
pub fn translate(
    build_dir: &Path,
    suite: &str,
    out_dir: &Path,
    runner_output: Option<&str>,
) -> Result<Translation, ReportError> {
    let testing_dir = build_dir.join("Testing");
    let no_tests = runner_output.is_some_and(has_no_tests_marker);

    let records = match ctest::read_report(&testing_dir) {
        Ok(records) => records,
        Err(ReportError::MissingTag { .. })
        | Err(ReportError::MissingRunDirectory { .. })
        | Err(ReportError::Read { .. })
            if no_tests =>
        {
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let translation = write_report(suite, &records, out_dir)?;
    if translation.tests == 0 && !no_tests {
        return Err(ReportError::NoTestCases {
            path: translation.path,
        });
    }
    Ok(translation)
}

/// Write `records` as the portable report for `suite` into `out_dir`.
pub fn write_report(
    suite: &str,
    records: &[TestRecord],
    out_dir: &Path,
) -> Result<Translation, ReportError> {
    let path = out_dir.join(report_file_name(suite));
    let doc = junit::render(suite, records);

    std::fs::create_dir_all(out_dir)
        .and_then(|_| std::fs::write(&path, doc))
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

    Ok(Translation {
        path,
        tests: records.len(),
        errors: records
            .iter()
            .filter(|r| r.status != TestStatus::Passed)
            .count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Site>
  <Testing>
    <Test Status="passed">
      <Name>passes</Name>
      <Results>
        <NamedMeasurement name="Execution Time"><Value>0.1</Value></NamedMeasurement>
        <Measurement><Value>ok
</Value></Measurement>
      </Results>
    </Test>
    <Test Status="failed">
      <Name>fails</Name>
      <Results>
        <NamedMeasurement name="Exit Code"><Value>1</Value></NamedMeasurement>
        <NamedMeasurement name="Exit Value"><Value>1</Value></NamedMeasurement>
        <NamedMeasurement name="Execution Time"><Value>0.2</Value></NamedMeasurement>
        <Measurement><Value>boom &amp; bust
</Value></Measurement>
      </Results>
    </Test>
  </Testing>
</Site>
"#;

    fn native_report(dir: &Path) {
        let testing = dir.join("Testing");
        fs::create_dir_all(testing.join("20240101-0000")).unwrap();
        fs::write(testing.join("TAG"), "20240101-0000\nExperimental\n").unwrap();
        fs::write(testing.join("20240101-0000").join("Test.xml"), REPORT).unwrap();
    }

    #[test]
    fn test_translate_writes_suite() {
        let tmp = TempDir::new().unwrap();
        native_report(tmp.path());

        let out = tmp.path().join("reports");
        let translation = translate(tmp.path(), "Debug", &out, None).unwrap();
        assert_eq!(translation.tests, 2);
        assert_eq!(translation.errors, 1);
        assert_eq!(translation.path, out.join("Debug.junit.xml"));

        let doc = fs::read_to_string(&translation.path).unwrap();
        assert_eq!(doc.matches("<system-out>ok\n</system-out>").count(), 1);
        assert_eq!(
            doc.matches("<error message=\"1(1)\">boom &amp; bust\n</error>").count(),
            1
        );
    }

    #[test]
    fn test_translate_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        native_report(tmp.path());

        let first = translate(tmp.path(), "Release", tmp.path(), None).unwrap();
        let first_bytes = fs::read(&first.path).unwrap();
        let second = translate(tmp.path(), "Release", tmp.path(), None).unwrap();
        assert_eq!(first_bytes, fs::read(&second.path).unwrap());
    }

    #[test]
    fn test_missing_report_is_error_without_marker() {
        let tmp = TempDir::new().unwrap();
        let err = translate(tmp.path(), "Debug", tmp.path(), Some("garbage")).unwrap_err();
        assert!(matches!(err, ReportError::MissingTag { .. }));
        assert!(!tmp.path().join("Debug.junit.xml").exists());
    }

    #[test]
    fn test_report_without_entries_needs_marker() {
        let tmp = TempDir::new().unwrap();
        let testing = tmp.path().join("Testing");
        fs::create_dir_all(testing.join("20240101-0000")).unwrap();
        fs::write(testing.join("TAG"), "20240101-0000\n").unwrap();
        fs::write(
            testing.join("20240101-0000").join("Test.xml"),
            "<Site><Testing></Testing></Site>",
        )
        .unwrap();

        let err = translate(tmp.path(), "Debug", tmp.path(), Some("Test project /b\n")).unwrap_err();
        assert!(matches!(err, ReportError::NoTestCases { .. }));
        assert!(tmp.path().join("Debug.junit.xml").exists());

        let output = "Test project /b\nNo tests were found!!!\n";
        let translation = translate(tmp.path(), "Debug", tmp.path(), Some(output)).unwrap();
        assert_eq!(translation.tests, 0);
    }

    #[test]
    fn test_missing_report_with_no_tests_marker_is_empty() {
        let tmp = TempDir::new().unwrap();
        let output = "Test project /build\nNo tests were found!!!\n";
        let translation = translate(tmp.path(), "Debug", tmp.path(), Some(output)).unwrap();
        assert_eq!(translation.tests, 0);
        let doc = fs::read_to_string(translation.path).unwrap();
        assert!(doc.contains("tests=\"0\""));
    }
}
