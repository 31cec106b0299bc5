//! Build log collaborator.
//!
//! Every phase transition and every external command goes through a
//! [`Logger`]. Records are forwarded to `tracing` and, when a log file is
//! configured, appended to it as plain text.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

/// The fixed vocabulary of log record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Header,
    Normal,
    Detail,
    CommandDescription,
    Command,
    Output,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Header => "header",
            LogTag::Normal => "normal",
            LogTag::Detail => "detail",
            LogTag::CommandDescription => "command_description",
            LogTag::Command => "command",
            LogTag::Output => "output",
        }
    }
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured log record (test capture sink only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub tag: LogTag,
    pub text: String,
}

/// Cheap-to-clone handle to the build log.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    file: Option<Arc<Mutex<File>>>,
    capture: Option<Arc<Mutex<Vec<LogRecord>>>>,
}

impl Logger {
    /// A logger that only forwards to `tracing`.
    pub fn new() -> Self {
        Logger::default()
    }

    /// A logger that also appends every record to `path`.
    ///
    /// Any previous file at `path` is truncated.
    pub fn with_file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::util::fs::ensure_dir(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open build log: {}", path.display()))?;

        Ok(Logger {
            file: Some(Arc::new(Mutex::new(file))),
            capture: None,
        })
    }

    /// A logger that keeps every record in memory.
    pub fn capturing() -> Self {
        Logger {
            file: None,
            capture: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Emit one record.
    pub fn log(&self, text: &str, tag: LogTag) {
        match tag {
            LogTag::Header => tracing::info!("== {} ==", text),
            LogTag::Normal => tracing::info!("{}", text),
            LogTag::CommandDescription => tracing::info!("{}", text),
            LogTag::Command => tracing::info!("$ {}", text),
            LogTag::Detail => tracing::debug!("{}", text),
            LogTag::Output => tracing::debug!("  {}", text),
        }

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let line = match tag {
                    LogTag::Header => format!("==== {} ====\n", text),
                    LogTag::Command => format!("$ {}\n", text),
                    LogTag::CommandDescription => format!("-- {}\n", text),
                    _ => format!("{}\n", text),
                };
                // The file sink is best-effort; tracing already has the record.
                let _ = file.write_all(line.as_bytes());
            }
        }

        if let Some(capture) = &self.capture {
            if let Ok(mut records) = capture.lock() {
                records.push(LogRecord {
                    tag,
                    text: text.to_string(),
                });
            }
        }
    }

    pub fn header(&self, text: &str) {
        self.log(text, LogTag::Header);
    }

    pub fn normal(&self, text: &str) {
        self.log(text, LogTag::Normal);
    }

    pub fn detail(&self, text: &str) {
        self.log(text, LogTag::Detail);
    }

    /// Records seen so far by a capturing logger.
    pub fn records(&self) -> Vec<LogRecord> {
        self.capture
            .as_ref()
            .and_then(|c| c.lock().ok().map(|r| r.clone()))
            .unwrap_or_default()
    }

    /// Texts of all captured records with the given tag.
    pub fn texts(&self, tag: LogTag) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.tag == tag)
            .map(|r| r.text)
            .collect()
    }

    /// Flush the file sink.
    pub fn close(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
