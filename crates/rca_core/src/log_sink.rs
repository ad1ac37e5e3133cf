//! Observable, append-only log of bridge activity
//!
//! Entries are kept in insertion order and never change once appended. Readers get
//! snapshots through [`LogSink::entries`] and can follow additions through
//! [`LogSink::subscribe`]; only [`LogSink::clear`] removes anything, and it removes
//! everything.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Width the kind label is padded to inside the brackets of a log line
pub const KIND_WIDTH: usize = 12;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    Info,
    Warning,
    Error,
    ScriptOutput,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Info => "Info",
            LogKind::Warning => "Warning",
            LogKind::Error => "Error",
            LogKind::ScriptOutput => "ScriptOutput",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    timestamp: DateTime<Local>,
    kind: LogKind,
    message: String,
}

impl LogEntry {
    fn new(kind: LogKind, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            message: format_message(kind, message),
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn kind(&self) -> LogKind {
        self.kind
    }

    /// The formatted line, `[<kind padded to 12>] <message>`
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Change notifications delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Appended(LogEntry),
    Cleared,
}

pub fn format_message(kind: LogKind, message: &str) -> String {
    format!("[{kind:<width$}] {message}", width = KIND_WIDTH)
}

struct Inner {
    entries: RwLock<Vec<LogEntry>>,
    events: broadcast::Sender<LogEvent>,
}

/// Shared handle to one log. Clones refer to the same entries.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Inner>,
}

impl LogSink {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(Vec::new()),
                events,
            }),
        }
    }

    /// Append a message of the given kind. Blank messages are ignored.
    pub fn append(&self, kind: LogKind, message: &str) {
        self.append_lines(kind, &[message]);
    }

    /// Append several messages of one kind as a contiguous group: no entry from another
    /// writer can land between them. Blank messages are ignored.
    pub fn append_lines<M: AsRef<str>>(&self, kind: LogKind, messages: &[M]) {
        let messages: Vec<&str> = messages
            .iter()
            .map(AsRef::as_ref)
            .filter(|message| !message.trim().is_empty())
            .collect();
        if messages.is_empty() {
            return;
        }

        // hold the lock while notifying so subscribers observe insertion order
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for message in messages {
            match kind {
                LogKind::Info | LogKind::ScriptOutput => debug!(target: "rca::log", kind = %kind, "{message}"),
                LogKind::Warning => warn!(target: "rca::log", kind = %kind, "{message}"),
                LogKind::Error => error!(target: "rca::log", kind = %kind, "{message}"),
            }

            let entry = LogEntry::new(kind, message);
            entries.push(entry.clone());
            let _ = self.inner.events.send(LogEvent::Appended(entry));
        }
    }

    pub fn info(&self, message: &str) {
        self.append(LogKind::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.append(LogKind::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.append(LogKind::Error, message);
    }

    pub fn script_output(&self, message: &str) {
        self.append(LogKind::ScriptOutput, message);
    }

    /// Snapshot of all entries in insertion order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive every entry appended (and every clear) after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.inner.events.subscribe()
    }

    /// Remove all entries. Operator action only.
    pub fn clear(&self) {
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        let _ = self.inner.events.send(LogEvent::Cleared);
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("entries", &format!("<{} entries>", self.len()))
            .finish()
    }
}
