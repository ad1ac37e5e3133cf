//! Capturing interpreter output for a single execution

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::InterpreterError;
use crate::interpreter::ScriptInterpreter;

/// In-memory text sink the interpreter writes to while a capture is open
#[derive(Clone, Default)]
pub struct OutputBuffer {
    text: Arc<Mutex<String>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, text: &str) {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
    }

    pub fn contents(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take everything written so far, leaving the buffer empty
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.text.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBuffer")
            .field(
                "len",
                &self.text.lock().unwrap_or_else(PoisonError::into_inner).len(),
            )
            .finish()
    }
}

/// Where an interpreter's standard output goes
#[derive(Debug, Clone, Default)]
pub enum OutputTarget {
    /// Whatever the interpreter wrote to before anything was redirected
    #[default]
    Ambient,
    Buffer(OutputBuffer),
}

/// Text produced by one execution, with NUL characters removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    text: String,
}

impl CapturedOutput {
    pub fn new(raw: &str) -> Self {
        Self {
            text: raw.replace('\0', ""),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// An open capture. Must be closed with [`OutputCapture::end`] on the same interpreter.
#[must_use = "an open capture must be ended to restore the interpreter's output"]
#[derive(Debug)]
pub struct OutputCapture {
    buffer: OutputBuffer,
    previous: OutputTarget,
}

impl OutputCapture {
    /// Redirect the interpreter's output into a private buffer
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter refuses the redirection
    pub fn begin<I: ScriptInterpreter + ?Sized>(
        interpreter: &mut I,
    ) -> Result<Self, InterpreterError> {
        let buffer = OutputBuffer::new();
        let previous = interpreter.redirect_output(OutputTarget::Buffer(buffer.clone()))?;
        Ok(Self { buffer, previous })
    }

    /// Restore the previous output destination and return what was captured
    ///
    /// # Errors
    ///
    /// Returns an error if the previous destination cannot be restored
    pub fn end<I: ScriptInterpreter + ?Sized>(
        self,
        interpreter: &mut I,
    ) -> Result<CapturedOutput, InterpreterError> {
        interpreter.redirect_output(self.previous)?;
        Ok(CapturedOutput::new(&self.buffer.take()))
    }
}
