//! Portable (JUnit-style) test report writer.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::ctest::{TestRecord, TestStatus};

/// Render one `<testsuite>` document for `suite`.
///
/// Passing tests embed their output in `<system-out>`; every other status gets
/// an `<error message="EXITCODE(EXITVALUE)">` wrapping the output.
pub fn render(suite: &str, records: &[TestRecord]) -> String {
    let errors = records
        .iter()
        .filter(|r| r.status != TestStatus::Passed)
        .count();

    let mut doc = String::new();
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        doc,
        "<testsuite name=\"{}\" tests=\"{}\" errors=\"{}\">",
        escape(suite),
        records.len(),
        errors
    );

    for record in records {
        let _ = writeln!(
            doc,
            "  <testcase name=\"{}\" classname=\"{}\" time=\"{}\">",
            escape(record.name.as_str()),
            escape(suite),
            record.time
        );
        match record.status {
            TestStatus::Passed => {
                let _ = writeln!(
                    doc,
                    "    <system-out>{}</system-out>",
                    escape(record.output.as_str())
                );
            }
            TestStatus::Other(_) => {
                let message = format!("{}({})", record.exit_code, record.exit_value);
                let _ = writeln!(
                    doc,
                    "    <error message=\"{}\">{}</error>",
                    escape(message.as_str()),
                    escape(record.output.as_str())
                );
            }
        }
        doc.push_str("  </testcase>\n");
    }

    doc.push_str("</testsuite>\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, status: TestStatus, code: &str, value: &str, output: &str) -> TestRecord {
        TestRecord {
            name: name.to_string(),
            status,
            exit_code: code.to_string(),
            exit_value: value.to_string(),
            time: 0.5,
            output: output.to_string(),
        }
    }

    #[test]
    fn test_render_pass_and_fail() {
        let records = vec![
            record("a", TestStatus::Passed, "", "", "ok\n"),
            record("b", TestStatus::Other("failed".into()), "1", "1", "boom\n"),
        ];
        let doc = render("Debug", &records);

        assert_eq!(doc.matches("<system-out>ok\n</system-out>").count(), 1);
        assert_eq!(doc.matches("<error message=\"1(1)\">boom\n</error>").count(), 1);
        assert!(doc.contains("<testcase name=\"a\" classname=\"Debug\" time=\"0.5\">"));
        roxmltree::Document::parse(&doc).unwrap();
    }

    #[test]
    fn test_render_escapes_text_and_attributes() {
        let records = vec![record(
            "x<y>",
            TestStatus::Other("failed".into()),
            "Failed",
            "\"2\"",
            "a & b <c>",
        )];
        let doc = render("S&S", &records);

        assert!(doc.contains("a &amp; b &lt;c&gt;"));
        assert!(doc.contains("name=\"x&lt;y&gt;\""));
        assert!(doc.contains("classname=\"S&amp;S\""));
        assert!(!doc.contains("a & b"));

        let parsed = roxmltree::Document::parse(&doc).unwrap();
        let error = parsed
            .descendants()
            .find(|n| n.has_tag_name("error"))
            .unwrap();
        assert_eq!(error.attribute("message"), Some("Failed(\"2\")"));
        assert_eq!(error.text(), Some("a & b <c>"));
    }

    #[test]
    fn test_render_empty_suite() {
        let doc = render("Release", &[]);
        assert!(doc.contains("tests=\"0\""));
        assert!(!doc.contains("<testcase"));
        roxmltree::Document::parse(&doc).unwrap();
    }
}
