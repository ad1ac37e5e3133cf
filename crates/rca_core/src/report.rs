//! Execution reports and their fixed text format.
//!
//! Consumers parse these markers, so the text must stay byte-for-byte stable.

use serde::Serialize;

use crate::capture::CapturedOutput;
use crate::log_sink::{LogKind, LogSink};

pub const START_MARKER: &str = "--- [PYTHON EXECUTION START] ---";
pub const END_MARKER: &str = "--- [PYTHON EXECUTION END] ---";
pub const ERROR_START_MARKER: &str = "--- [PYTHON ERROR OUTPUT START] ---";
pub const ERROR_END_MARKER: &str = "--- [PYTHON ERROR OUTPUT END] ---";

pub const OUTPUT_PREFIX: &str = "Output: ";
pub const ERROR_PREFIX: &str = "Python Error: ";
pub const RETURN_VALUE_PREFIX: &str = "Return value: ";
pub const NO_OUTPUT: &str = "(no output)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    succeeded: bool,
    body: String,
    raw: Option<String>,
}

impl ExecutionReport {
    pub fn success(output: &CapturedOutput, raw: Option<String>) -> Self {
        Self {
            succeeded: true,
            body: compose_body(output, raw.as_deref()),
            raw,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            body: message.into(),
            raw: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Composed output on success, the error message on failure
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Rendering of the script's return value, if it produced one
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn kind(&self) -> LogKind {
        if self.succeeded {
            LogKind::ScriptOutput
        } else {
            LogKind::Error
        }
    }

    /// The three report lines, markers included
    pub fn lines(&self) -> [String; 3] {
        if self.succeeded {
            [
                START_MARKER.to_string(),
                format!("{OUTPUT_PREFIX}{}", self.body),
                END_MARKER.to_string(),
            ]
        } else {
            [
                ERROR_START_MARKER.to_string(),
                format!("{ERROR_PREFIX}{}", self.body),
                ERROR_END_MARKER.to_string(),
            ]
        }
    }

    /// Text handed back to callers: every line newline-terminated
    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in self.lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    /// Mirror the report into `log` as three adjacent entries
    pub fn log_to(&self, log: &LogSink) {
        log.append_lines(self.kind(), &self.lines());
    }
}

/// Combine captured output and a return value into a report body
pub fn compose_body(output: &CapturedOutput, raw: Option<&str>) -> String {
    let mut body = String::new();
    if !output.is_blank() {
        body.push_str(output.text().trim_end());
    }

    if let Some(raw) = raw {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(RETURN_VALUE_PREFIX);
        body.push_str(raw);
    }

    if body.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        body
    }
}
