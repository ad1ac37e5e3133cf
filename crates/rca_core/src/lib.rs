//! # RCA Core
//!
//! Runs script text from asynchronous callers inside an embedded interpreter that may
//! only be touched from one thread owned by the host application.
//!
//! - [`queue`]: FIFO marshaling onto the owning thread, with a future per item
//! - [`context`]: the host's active session, re-read for every request
//! - [`capture`]: redirection of interpreter output for one execution
//! - [`report`]: the marker-delimited report text handed back to callers
//! - [`log_sink`]: the observable log every report is mirrored into
//! - [`bridge`]: ties the above together behind [`ScriptBridge::execute`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use rca_core::{HostThread, LogSink, ScriptBridge, queue};
//! use rca_core::session::{Document, DocumentSession};
//! use std::sync::Arc;
//!
//! let (queue, pump) = queue::channel(None);
//! let _host = HostThread::spawn("rca-host", pump, MyInterpreter::new)?;
//!
//! let bridge = ScriptBridge::new(queue, LogSink::new());
//! bridge.set_session(Arc::new(
//!     DocumentSession::new("Host").with_document(Document::new("Tower A")),
//! ));
//!
//! let report = bridge.execute("doc.Title").await;
//! ```

pub mod bridge;
pub mod capture;
pub mod context;
pub mod debug_info;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod log_sink;
pub mod queue;
pub mod report;
pub mod session;

pub use bridge::{ExecutionRequest, ExecutionState, ScriptBridge};
pub use capture::{CapturedOutput, OutputBuffer, OutputCapture, OutputTarget};
pub use context::{ContextStore, HostSession, SessionBindings};
pub use error::{BridgeError, DispatchError, InterpreterError, SessionError};
pub use host::HostThread;
pub use interpreter::ScriptInterpreter;
pub use log_sink::{LogEntry, LogEvent, LogKind, LogSink};
pub use queue::{MarshalQueue, Pending, QueuePump};
pub use report::ExecutionReport;

#[cfg(test)]
mod test_utils;
