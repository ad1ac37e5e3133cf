use thiserror::Error;

/// Failures of the owning-thread dispatch primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Host dispatch queue is closed; the owning thread is not running")]
    HostUnavailable,
    #[error("Host dispatch queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },
    #[error("Work item was dropped before it completed on the owning thread")]
    Abandoned,
}

/// Failures raised by a host session while producing script bindings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No active document in host.")]
    NoActiveDocument,
    #[error("Failed building session bindings: {0}")]
    Bindings(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Bindings(err.to_string())
    }
}

/// Error raised by the embedded interpreter. The message is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InterpreterError {
    message: String,
}

impl InterpreterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Host context not set. Call set_context() first.")]
    ContextNotSet,

    #[error("Context must be a {expected} instance")]
    InvalidContextType { expected: &'static str },

    #[error(transparent)]
    DispatchFailure(#[from] DispatchError),

    #[error(transparent)]
    InterpreterError(#[from] InterpreterError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
