//! The script execution bridge.
//!
//! [`ScriptBridge::execute`] may be called from any task. Each non-blank request is
//! marshaled onto the owning thread, where it moves through
//!
//! ```text
//! Idle → Submitted → Dispatched → ContextInjecting → Running → Composing → Succeeded | Failed
//! ```
//!
//! and is then resolved back to the caller. Every failure, including failure to reach
//! the owning thread at all, comes back as an error report rather than an `Err`.

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::capture::OutputCapture;
use crate::context::{ContextStore, HostSession};
use crate::error::{BridgeError, Result};
use crate::interpreter::ScriptInterpreter;
use crate::log_sink::LogSink;
use crate::queue::MarshalQueue;
use crate::report::ExecutionReport;

/// Lifecycle of a single execution, reported on `tracing` debug events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Nothing submitted; blank input never leaves this state
    Idle,
    Submitted,
    Dispatched,
    ContextInjecting,
    Running,
    Composing,
    Succeeded,
    Failed,
    Resolved,
}

/// One unit of script work, owned by the bridge until its report is delivered
#[derive(Debug)]
pub struct ExecutionRequest {
    id: Uuid,
    code: String,
}

impl ExecutionRequest {
    fn new(code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.to_string(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Runs on the owning thread. Always produces a report, and always logs it.
    fn run<S, I>(self, interpreter: &mut I, context: &ContextStore<S>, log: &LogSink) -> ExecutionReport
    where
        S: HostSession,
        I: ScriptInterpreter,
    {
        let id = self.id;
        debug!(%id, state = ?ExecutionState::Dispatched, "Request reached owning thread");

        let report = match self.execute(interpreter, context) {
            Ok(report) => {
                debug!(%id, state = ?ExecutionState::Succeeded, "Script finished");
                report
            }
            Err(e) => {
                debug!(%id, state = ?ExecutionState::Failed, err = %e, "Script failed");
                ExecutionReport::failure(e.to_string())
            }
        };

        report.log_to(log);
        report
    }

    fn execute<S, I>(&self, interpreter: &mut I, context: &ContextStore<S>) -> Result<ExecutionReport>
    where
        S: HostSession,
        I: ScriptInterpreter,
    {
        // read at dispatch time so a session switched after submission is honoured
        let session = context.require_active_session()?;

        // the scope outlives each request; only the session bindings are replaced
        debug!(id = %self.id, state = ?ExecutionState::ContextInjecting, "Injecting session bindings");
        let bindings = session.bindings()?;
        for (name, value) in &bindings {
            interpreter.set_variable(name, value)?;
        }

        debug!(id = %self.id, state = ?ExecutionState::Running, "Running script");
        let capture = OutputCapture::begin(interpreter)?;
        let outcome = interpreter.run(&self.code);
        let captured = capture.end(interpreter);
        let raw = outcome?;
        let captured = captured?;

        debug!(id = %self.id, state = ?ExecutionState::Composing, "Composing report");
        Ok(ExecutionReport::success(&captured, raw))
    }
}

/// Accepts script text from async callers and runs it on the owning thread.
///
/// `S` is the host's session type, `I` the interpreter living on the owning thread.
pub struct ScriptBridge<S, I> {
    queue: MarshalQueue<I>,
    context: Arc<ContextStore<S>>,
    log: LogSink,
    _interpreter: PhantomData<fn(&mut I)>,
}

impl<S, I> ScriptBridge<S, I>
where
    S: HostSession,
    I: ScriptInterpreter + 'static,
{
    pub fn new(queue: MarshalQueue<I>, log: LogSink) -> Self {
        Self::with_context(queue, Arc::new(ContextStore::new()), log)
    }

    /// Use a context store shared with the host
    pub fn with_context(queue: MarshalQueue<I>, context: Arc<ContextStore<S>>, log: LogSink) -> Self {
        Self {
            queue,
            context,
            log,
            _interpreter: PhantomData,
        }
    }

    /// Store an untyped session handle from the host
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidContextType`] if `handle` is not an `S`
    pub fn set_context(&self, handle: Arc<dyn Any + Send + Sync>) -> Result<()> {
        let session = handle
            .downcast::<S>()
            .map_err(|_| BridgeError::InvalidContextType {
                expected: type_name::<S>(),
            })?;
        self.context.set_active_session(session);
        Ok(())
    }

    pub fn set_session(&self, session: Arc<S>) {
        self.context.set_active_session(session);
    }

    pub fn context(&self) -> &Arc<ContextStore<S>> {
        &self.context
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }

    /// Run `code` and return the formatted report.
    ///
    /// Blank input returns an empty string straight away, without logging. Otherwise the
    /// result is always a report, never an error, and has also been written to the log.
    pub async fn execute(&self, code: &str) -> String {
        self.execute_report(code)
            .await
            .map(|report| report.render())
            .unwrap_or_default()
    }

    /// Like [`ScriptBridge::execute`], but returns the structured report (`None` for blank input)
    pub async fn execute_report(&self, code: &str) -> Option<ExecutionReport> {
        if code.trim().is_empty() {
            trace!(state = ?ExecutionState::Idle, "Blank script, nothing submitted");
            return None;
        }

        let request = ExecutionRequest::new(code);
        let id = request.id();
        debug!(%id, state = ?ExecutionState::Submitted, "Submitting script");

        let context = Arc::clone(&self.context);
        let log = self.log.clone();
        let submitted = self
            .queue
            .submit(move |interpreter: &mut I| request.run(interpreter, &context, &log));

        let dispatched = match submitted {
            Ok(pending) => pending.await,
            Err(e) => Err(e),
        };

        let report = dispatched.unwrap_or_else(|e| {
            warn!(%id, "Failed dispatching script to owning thread: {e}");
            let report = ExecutionReport::failure(BridgeError::from(e).to_string());
            report.log_to(&self.log);
            report
        });

        debug!(%id, state = ?ExecutionState::Resolved, succeeded = report.succeeded(), "Request resolved");
        Some(report)
    }
}

impl<S, I> ScriptBridge<S, I>
where
    S: HostSession,
    I: ScriptInterpreter + 'static,
{
    /// Discard every variable scripts have defined so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the owning thread cannot be reached or the interpreter
    /// cannot allocate a new scope
    pub async fn reset_scope(&self) -> Result<()> {
        let reset = self
            .queue
            .submit(|interpreter: &mut I| interpreter.create_scope())?
            .await?;
        reset?;
        debug!("Interpreter scope reset");
        Ok(())
    }
}

impl<S, I> Clone for ScriptBridge<S, I> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            context: Arc::clone(&self.context),
            log: self.log.clone(),
            _interpreter: PhantomData,
        }
    }
}

impl<S, I> fmt::Debug for ScriptBridge<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptBridge")
            .field("queue", &self.queue)
            .field("context", &self.context)
            .field("log", &self.log)
            .finish()
    }
}
