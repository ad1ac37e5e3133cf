//! Process-wide shortcuts for writing to the application's log.
//!
//! The host constructs one [`LogSink`] and installs it here once; these helpers only
//! forward to that instance. Writes made before anything is installed are dropped.

use std::sync::OnceLock;
use tracing::trace;

use crate::log_sink::{LogKind, LogSink};

static INSTALLED: OnceLock<LogSink> = OnceLock::new();

/// Install `sink` as the process-wide log. Returns `false` if one was already installed.
pub fn install(sink: LogSink) -> bool {
    INSTALLED.set(sink).is_ok()
}

/// The installed sink, if any
pub fn sink() -> Option<&'static LogSink> {
    INSTALLED.get()
}

pub fn write(message: &str) {
    forward(LogKind::Info, message);
}

pub fn write_warning(message: &str) {
    forward(LogKind::Warning, message);
}

pub fn write_error(message: &str) {
    forward(LogKind::Error, message);
}

pub fn write_script(message: &str) {
    forward(LogKind::ScriptOutput, message);
}

fn forward(kind: LogKind, message: &str) {
    match INSTALLED.get() {
        Some(sink) => sink.append(kind, message),
        None => trace!(kind = %kind, "No log sink installed, dropping: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_to_installed_sink() {
        let sink = LogSink::new();
        assert!(install(sink.clone()));
        assert!(!install(LogSink::new()));

        write("hello");
        write_error("bad");
        write_script("out");

        let installed = super::sink().unwrap();
        let kinds: Vec<_> = installed.entries().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![LogKind::Info, LogKind::Error, LogKind::ScriptOutput]
        );
        assert_eq!(sink.len(), 3);
    }
}
