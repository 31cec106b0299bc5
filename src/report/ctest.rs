//! Reader for CTest's structured dashboard output.
//!
//! A `Testing/` directory holds a `TAG` file whose first line names the
//! current run's subdirectory; that subdirectory contains `Test.xml`:
//!
//! ```xml
//! <Site>
//!   <Testing>
//!     <Test Status="failed">
//!       <Name>foo</Name>
//!       <Results>
//!         <NamedMeasurement name="Exit Code"><Value>Failed</Value></NamedMeasurement>
//!         <NamedMeasurement name="Exit Value"><Value>1</Value></NamedMeasurement>
//!         <NamedMeasurement name="Execution Time"><Value>0.02</Value></NamedMeasurement>
//!         <Measurement><Value>captured output</Value></Measurement>
//!       </Results>
//!     </Test>
//!   </Testing>
//! </Site>
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use base64::Engine;
use flate2::read::ZlibDecoder;
use roxmltree::{Document, Node};

use super::ReportError;

/// Result status of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    /// Anything else the runner reports (`failed`, `notrun`, ...).
    Other(String),
}

impl TestStatus {
    fn from_attr(value: &str) -> Self {
        if value == "passed" {
            TestStatus::Passed
        } else {
            TestStatus::Other(value.to_string())
        }
    }
}

/// One test entry of a native report.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub name: String,
    pub status: TestStatus,
    pub exit_code: String,
    pub exit_value: String,
    /// Execution time in seconds.
    pub time: f64,
    pub output: String,
}

/// Locate the current run's `Test.xml` below a `Testing/` directory.
pub fn locate_report(testing_dir: &Path) -> Result<PathBuf, ReportError> {
    let tag_path = testing_dir.join("TAG");
    let tag = std::fs::read_to_string(&tag_path).map_err(|source| ReportError::MissingTag {
        path: tag_path.clone(),
        source,
    })?;

    let run = tag.lines().next().map(str::trim).unwrap_or_default();
    let run_dir = testing_dir.join(run);
    if run.is_empty() || !run_dir.is_dir() {
        return Err(ReportError::MissingRunDirectory { path: run_dir });
    }

    Ok(run_dir.join("Test.xml"))
}

/// Read every test entry of the current run below `testing_dir`.
pub fn read_report(testing_dir: &Path) -> Result<Vec<TestRecord>, ReportError> {
    let report = locate_report(testing_dir)?;
    let contents = std::fs::read_to_string(&report).map_err(|source| ReportError::Read {
        path: report.clone(),
        source,
    })?;
    parse_test_xml(&contents).map_err(|e| match e {
        ReportError::Malformed { message, .. } => ReportError::Malformed {
            path: Some(report),
            message,
        },
        other => other,
    })
}

/// Parse the contents of a `Test.xml` document.
pub fn parse_test_xml(xml: &str) -> Result<Vec<TestRecord>, ReportError> {
    let doc = Document::parse(xml).map_err(|e| malformed(e.to_string()))?;

    let testing = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("Testing"))
        .ok_or_else(|| malformed("no <Testing> element"))?;

    testing
        .children()
        .filter(|n| n.has_tag_name("Test"))
        .map(parse_test)
        .collect()
}

fn parse_test(test: Node<'_, '_>) -> Result<TestRecord, ReportError> {
    let name = child(test, "Name")
        .map(text_of)
        .ok_or_else(|| malformed("<Test> without <Name>"))?;
    let status = TestStatus::from_attr(test.attribute("Status").unwrap_or("notrun"));

    let mut record = TestRecord {
        name,
        status,
        exit_code: String::new(),
        exit_value: String::new(),
        time: 0.0,
        output: String::new(),
    };

    let Some(results) = child(test, "Results") else {
        return Ok(record);
    };

    for measurement in results.children().filter(|n| n.is_element()) {
        let Some(value) = child(measurement, "Value") else {
            continue;
        };
        let value = decode_value(value)?;

        if measurement.has_tag_name("Measurement") {
            record.output = value;
            continue;
        }

        match measurement.attribute("name") {
            Some("Exit Code") => record.exit_code = value.trim().to_string(),
            Some("Exit Value") => record.exit_value = value.trim().to_string(),
            Some("Execution Time") => record.time = value.trim().parse().unwrap_or(0.0),
            _ => {}
        }
    }

    Ok(record)
}

/// Text of a `<Value>`, undoing CTest's optional base64 + zlib packing.
fn decode_value(value: Node<'_, '_>) -> Result<String, ReportError> {
    let raw = text_of(value);
    if value.attribute("encoding") != Some("base64") {
        return Ok(raw);
    }

    let compact: String = raw.split_whitespace().collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| malformed(format!("invalid base64 measurement: {}", e)))?;

    if value.attribute("compression").is_some() {
        let mut inflated = Vec::new();
        ZlibDecoder::new(bytes.as_slice())
            .read_to_end(&mut inflated)
            .map_err(|e| malformed(format!("invalid compressed measurement: {}", e)))?;
        Ok(String::from_utf8_lossy(&inflated).into_owned())
    } else {
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn text_of(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn malformed(message: impl Into<String>) -> ReportError {
    ReportError::Malformed {
        path: None,
        message: message.into(),
    }
}
