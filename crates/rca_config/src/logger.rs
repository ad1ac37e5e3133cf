//! `logger` section of `rca.json`: console and file logging for the CLI.
//!
//! The session log kept by the bridge is mirrored into tracing under the `rca::log`
//! target. Warnings and errors always reach the console; routine entries only do
//! with `echo_session_log`.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target the bridge's session log is mirrored under
pub const SESSION_LOG_TARGET: &str = "rca::log";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub enabled: bool,
    pub level: LogLevel,
    pub format: LoggerFormat,
    pub colors: bool,
    /// JSONL file receiving a copy of every event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,
    /// Print info and script output entries of the session log as well
    pub echo_session_log: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::default(),
            format: LoggerFormat::default(),
            colors: true,
            file: None,
            echo_session_log: false,
        }
    }
}

impl LoggerConfig {
    /// Extra filter directive for the session log target, if one is needed
    pub fn session_log_directive(&self) -> Option<String> {
        self.echo_session_log
            .then(|| format!("{SESSION_LOG_TARGET}={}", LogLevel::Debug))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Ordered by severity, `Trace` lowest
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Level selected by `-q` / `-v`, if the flags override the config
    pub fn from_flags(quiet: bool, verbose: u8) -> Option<Self> {
        if quiet {
            return Some(LogLevel::Warn);
        }
        match verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_level_names() {
        let level: LogLevel = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
        assert_eq!(level.to_string(), "warn");
        assert_eq!(serde_json::to_string(&LogLevel::Trace).unwrap(), "\"trace\"");
        assert!(serde_json::from_str::<LogLevel>("\"verbose\"").is_err());
    }

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogLevel::from_flags(true, 2), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_flags(false, 0), None);
        assert_eq!(LogLevel::from_flags(false, 1), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_flags(false, 3), Some(LogLevel::Trace));
    }

    #[test]
    fn test_partial_logger_section() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format": "pretty", "echo_session_log": true}"#).unwrap();

        assert!(cfg.enabled);
        assert!(cfg.colors);
        assert_eq!(cfg.level, LogLevel::Info);
        assert_eq!(cfg.format, LoggerFormat::Pretty);
        assert_eq!(cfg.session_log_directive().as_deref(), Some("rca::log=debug"));
        assert!(LoggerConfig::default().session_log_directive().is_none());
    }
}
