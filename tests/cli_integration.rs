//! CLI integration tests for buildrig.
//!
//! These exercise the binary end to end without needing a compiler suite:
//! argument handling, report translation and the checks that run before any
//! external tool is launched.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the buildrig binary command.
fn buildrig() -> Command {
    Command::cargo_bin("buildrig").unwrap()
}

fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const TEST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Site Name="ci">
  <Testing>
    <Test Status="passed">
      <Name>parser</Name>
      <Results>
        <NamedMeasurement type="numeric/double" name="Execution Time"><Value>0.1</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Code"><Value>Passed</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Value"><Value>0</Value></NamedMeasurement>
        <Measurement><Value>fine</Value></Measurement>
      </Results>
    </Test>
    <Test Status="failed">
      <Name>writer</Name>
      <Results>
        <NamedMeasurement type="numeric/double" name="Execution Time"><Value>0.2</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Code"><Value>Failed</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Value"><Value>3</Value></NamedMeasurement>
        <Measurement><Value>bad &lt;output&gt;</Value></Measurement>
      </Results>
    </Test>
  </Testing>
</Site>
"#;

fn write_testing_dir(build_dir: &Path) {
    let run = build_dir.join("Testing").join("20240301-1200");
    fs::create_dir_all(&run).unwrap();
    fs::write(
        build_dir.join("Testing").join("TAG"),
        "20240301-1200\nExperimental\n",
    )
    .unwrap();
    fs::write(run.join("Test.xml"), TEST_XML).unwrap();
}

// ============================================================================
// general
// ============================================================================

#[test]
fn test_help_lists_commands() {
    buildrig()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("package"))
        .stdout(predicate::str::contains("translate"));
}

#[test]
fn test_completions_bash() {
    buildrig()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("buildrig"));
}

#[test]
fn test_unknown_configuration_is_rejected() {
    buildrig()
        .args(["build", "--config", "Profile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration"));
}

#[test]
fn test_unknown_architecture_is_rejected() {
    buildrig()
        .args(["build", "--arch", "arm64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown target architecture"));
}

#[test]
fn test_install_conflicts_with_stage() {
    buildrig()
        .args(["build", "--install", "/opt/x", "--stage"])
        .assert()
        .failure();
}

#[test]
fn test_missing_source_dir_fails() {
    let tmp = temp_dir();
    buildrig()
        .args(["build", "--source"])
        .arg(tmp.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("source directory not found"));
}

// ============================================================================
// buildrig translate
// ============================================================================

#[test]
fn test_translate_writes_junit_report() {
    let tmp = temp_dir();
    let build_dir = tmp.path().join("Release");
    write_testing_dir(&build_dir);
    let out = tmp.path().join("reports");

    buildrig()
        .arg("translate")
        .arg(&build_dir)
        .args(["--suite", "Release", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tests, 1 errors"));

    let report = fs::read_to_string(out.join("Release.junit.xml")).unwrap();
    assert!(report.contains("<testsuite"));
    assert!(report.contains("name=\"parser\""));
    assert!(report.contains("<error message=\"Failed(3)\""));
    assert!(report.contains("bad &lt;output&gt;"));
}

#[test]
fn test_translate_without_report_fails() {
    let tmp = temp_dir();
    buildrig()
        .arg("translate")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("TAG"));
}

#[test]
fn test_translate_no_tests_marker_gives_empty_suite() {
    let tmp = temp_dir();
    let output = tmp.path().join("ctest.log");
    fs::write(&output, "Test project /w\nNo tests were found!!!\n").unwrap();

    buildrig()
        .arg("translate")
        .arg(tmp.path())
        .args(["--suite", "empty", "--runner-output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 tests"));

    assert!(tmp.path().join("empty.junit.xml").exists());
}

#[test]
fn test_translate_empty_report_warns_but_writes_suite() {
    let tmp = temp_dir();
    let run = tmp.path().join("Testing").join("20240301-1200");
    fs::create_dir_all(&run).unwrap();
    fs::write(tmp.path().join("Testing").join("TAG"), "20240301-1200\n").unwrap();
    fs::write(run.join("Test.xml"), "<Site><Testing></Testing></Site>").unwrap();

    buildrig()
        .arg("translate")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 tests"))
        .stderr(predicate::str::contains("lists no tests"));

    assert!(tmp.path().join("tests.junit.xml").exists());
}

// ============================================================================
// buildrig package
// ============================================================================

#[cfg(target_os = "linux")]
#[test]
fn test_package_requires_exactly_one_configuration() {
    let tmp = temp_dir();
    buildrig()
        .args(["package", "-c", "Debug", "-c", "Release", "--source"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one configuration"));

    let log = fs::read_to_string(tmp.path().join("build-output").join("buildlog.txt")).unwrap();
    assert!(log.contains("Fatal error"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_package_without_metadata_fails() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("VERSION.txt"),
        "MAJOR=2\nMINOR=0\nPATCH=0\n",
    )
    .unwrap();
    buildrig()
        .args(["package", "--source"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("debian"));
}
