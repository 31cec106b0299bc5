//! On-disk fixtures for common test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

/// A CTest `Test.xml` with one passing and one failing test.
pub const SAMPLE_TEST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Site Name="host">
  <Testing>
    <TestList>
      <Test>./unit/passes</Test>
      <Test>./unit/fails</Test>
    </TestList>
    <Test Status="passed">
      <Name>passes</Name>
      <Results>
        <NamedMeasurement type="numeric/double" name="Execution Time"><Value>0.25</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Code"><Value>Passed</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Value"><Value>0</Value></NamedMeasurement>
        <Measurement><Value>ok
</Value></Measurement>
      </Results>
    </Test>
    <Test Status="failed">
      <Name>fails</Name>
      <Results>
        <NamedMeasurement type="numeric/double" name="Execution Time"><Value>0.5</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Code"><Value>Failed</Value></NamedMeasurement>
        <NamedMeasurement type="text/string" name="Exit Value"><Value>1</Value></NamedMeasurement>
        <Measurement><Value>boom
</Value></Measurement>
      </Results>
    </Test>
  </Testing>
</Site>
"#;

/// Runner summary matching [`SAMPLE_TEST_XML`].
pub const SAMPLE_CTEST_OUTPUT: &str = "\
Test project /work/Release
    Start 1: passes
1/2 Test #1: passes ...........................   Passed    0.25 sec
    Start 2: fails
2/2 Test #2: fails ............................***Failed    0.50 sec

50% tests passed, 1 tests failed out of 2
";

/// Write a `Testing/` directory under `build_dir` whose current run holds `xml`.
pub fn write_ctest_report(build_dir: &Path, xml: &str) -> PathBuf {
    let run = "20240101-0000";
    let testing = build_dir.join("Testing");
    fs::create_dir_all(testing.join(run)).expect("failed to create run dir");
    fs::write(testing.join("TAG"), format!("{}\nExperimental\n", run))
        .expect("failed to write TAG");
    fs::write(testing.join(run).join("Test.xml"), xml).expect("failed to write Test.xml");
    testing
}

/// Create a minimal CMake project with version and packaging metadata.
///
/// Returns the source root inside `root`.
pub fn write_source_tree(root: &Path) -> PathBuf {
    let source = root.join("project");
    fs::create_dir_all(source.join("src")).expect("failed to create src dir");
    fs::write(
        source.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.10)\nproject(demo C)\nadd_library(demo src/demo.c)\n",
    )
    .expect("failed to write CMakeLists.txt");
    fs::write(source.join("src").join("demo.c"), "int demo(void) { return 0; }\n")
        .expect("failed to write source");
    fs::write(
        source.join("VERSION.txt"),
        "MAJOR=1\nMINOR=4\nPATCH=2\nSUFFIX=\n",
    )
    .expect("failed to write VERSION.txt");

    let debian = source.join("build").join("packaging").join("debian");
    fs::create_dir_all(&debian).expect("failed to create debian dir");
    fs::write(debian.join("control"), "Source: demo\n").expect("failed to write control");
    fs::write(debian.join("rules"), "#!/usr/bin/make -f\n").expect("failed to write rules");

    fs::create_dir_all(source.join(".git")).expect("failed to create .git");
    fs::write(source.join(".git").join("HEAD"), "ref: refs/heads/main\n")
        .expect("failed to write HEAD");

    source
}
