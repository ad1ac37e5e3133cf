use crate::capture::OutputTarget;
use crate::error::InterpreterError;

/// An embedded script interpreter.
///
/// Implementations are created on, and only used from, the host's owning thread, so
/// they need not be `Send`.
pub trait ScriptInterpreter {
    /// Replace the current variable scope with an empty one. The scope otherwise persists
    /// across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter cannot allocate a scope
    fn create_scope(&mut self) -> Result<(), InterpreterError>;

    /// Bind `value` to `name` in the current scope
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted into an interpreter value
    fn set_variable(&mut self, name: &str, value: &serde_json::Value)
    -> Result<(), InterpreterError>;

    /// Run `code` in the current scope, returning the rendering of its return value, if any
    ///
    /// # Errors
    ///
    /// Returns the interpreter's own message for syntax and runtime errors
    fn run(&mut self, code: &str) -> Result<Option<String>, InterpreterError>;

    /// Send standard output to `target`, returning the previous destination
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be swapped
    fn redirect_output(&mut self, target: OutputTarget) -> Result<OutputTarget, InterpreterError>;
}

impl<T: ScriptInterpreter + ?Sized> ScriptInterpreter for Box<T> {
    fn create_scope(&mut self) -> Result<(), InterpreterError> {
        (**self).create_scope()
    }

    fn set_variable(
        &mut self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<(), InterpreterError> {
        (**self).set_variable(name, value)
    }

    fn run(&mut self, code: &str) -> Result<Option<String>, InterpreterError> {
        (**self).run(code)
    }

    fn redirect_output(&mut self, target: OutputTarget) -> Result<OutputTarget, InterpreterError> {
        (**self).redirect_output(target)
    }
}
