//! # RCA Python Runtime
//!
//! Embedded CPython (via pyo3) implementing [`rca_core::ScriptInterpreter`].
//!
//! ## Behaviour
//!
//! - **Scope**: one globals dict is shared by every script run on the interpreter, so
//!   variables carry over; [`ScriptInterpreter::create_scope`] starts an empty one
//! - **Bindings**: JSON objects become `types.SimpleNamespace` values, so scripts write
//!   `doc.Title` rather than `doc["Title"]`
//! - **Return value**: when the last statement is an expression it is evaluated on its
//!   own and its `str()` is returned; `None` counts as no return value
//! - **Output**: `sys.stdout` is swapped for a writer feeding an [`OutputBuffer`] and put
//!   back afterwards
//!
//! `sys.stdout` is process-wide, so one process should host a single interpreter on a
//! single owning thread.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rca_core::ScriptInterpreter;
//! use rca_python_runtime::PythonInterpreter;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut python = PythonInterpreter::new()?;
//! python.set_variable("answer", &serde_json::json!(42))?;
//!
//! assert_eq!(python.run("answer * 2")?, Some("84".to_string()));
//! # Ok(())
//! # }
//! ```

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use rca_core::{InterpreterError, OutputBuffer, OutputTarget, ScriptInterpreter};
use std::ffi::CStr;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum PythonRuntimeError {
    #[error("{0}")]
    PythonError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<PyErr> for PythonRuntimeError {
    fn from(err: PyErr) -> Self {
        Python::with_gil(|_py| PythonRuntimeError::PythonError(err.to_string()))
    }
}

impl From<serde_json::Error> for PythonRuntimeError {
    fn from(err: serde_json::Error) -> Self {
        PythonRuntimeError::SerializationError(err.to_string())
    }
}

impl From<PythonRuntimeError> for InterpreterError {
    fn from(err: PythonRuntimeError) -> Self {
        InterpreterError::new(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PythonRuntimeError>;

const RUNNER_SOURCE: &CStr = cr#"
import ast
import json
import types


def _namespace(fields):
    return types.SimpleNamespace(**fields)


def to_python(payload):
    return json.loads(payload, object_hook=_namespace)


def run(source, scope):
    tree = ast.parse(source, filename="<script>", mode="exec")
    tail = None
    if tree.body and isinstance(tree.body[-1], ast.Expr):
        tail = ast.Expression(body=tree.body.pop().value)
    exec(compile(tree, "<script>", "exec"), scope)
    if tail is None:
        return None
    value = eval(compile(tail, "<script>", "eval"), scope)
    return None if value is None else str(value)
"#;

/// File-like object installed as `sys.stdout` while output is captured
#[pyclass]
struct BufferWriter {
    buffer: OutputBuffer,
}

#[pymethods]
impl BufferWriter {
    fn write(&self, text: &str) -> usize {
        self.buffer.write(text);
        text.chars().count()
    }

    fn flush(&self) {}

    fn isatty(&self) -> bool {
        false
    }

    fn writable(&self) -> bool {
        true
    }

    #[getter]
    fn encoding(&self) -> &'static str {
        "utf-8"
    }
}

fn new_scope(py: Python<'_>) -> PyResult<Py<PyDict>> {
    let scope = PyDict::new(py);
    scope.set_item("__builtins__", py.import("builtins")?)?;
    scope.set_item("__name__", "__main__")?;
    Ok(scope.unbind())
}

pub struct PythonInterpreter {
    runner: Py<PyModule>,
    scope: Py<PyDict>,
    output: OutputTarget,
    /// `sys.stdout` as it was before the first redirection
    ambient_stdout: Option<PyObject>,
}

impl PythonInterpreter {
    /// # Errors
    ///
    /// Returns an error if the embedded interpreter cannot be initialized
    pub fn new() -> Result<Self> {
        Self::with_search_paths::<&str>(&[])
    }

    /// Create an interpreter with extra entries appended to `sys.path`
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded interpreter cannot be initialized
    pub fn with_search_paths<P: AsRef<str>>(paths: &[P]) -> Result<Self> {
        Python::with_gil(|py| -> Result<Self> {
            let runner = PyModule::from_code(py, RUNNER_SOURCE, c"rca_runner.py", c"rca_runner")?;

            if !paths.is_empty() {
                let sys_path = py.import("sys")?.getattr("path")?;
                for path in paths {
                    debug!(path = path.as_ref(), "Adding Python search path");
                    sys_path.call_method1("append", (path.as_ref(),))?;
                }
            }

            Ok(Self {
                runner: runner.unbind(),
                scope: new_scope(py)?,
                output: OutputTarget::Ambient,
                ambient_stdout: None,
            })
        })
    }

    /// Version string of the embedded interpreter
    pub fn version() -> String {
        Python::with_gil(|py| py.version().to_string())
    }

    fn bind(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        Python::with_gil(|py| -> Result<()> {
            let converted = self
                .runner
                .bind(py)
                .getattr("to_python")?
                .call1((payload,))?;
            self.scope.bind(py).set_item(name, converted)?;
            Ok(())
        })
    }

    fn run_source(&self, code: &str) -> Result<Option<String>> {
        Python::with_gil(|py| -> Result<Option<String>> {
            let value = self
                .runner
                .bind(py)
                .getattr("run")?
                .call1((code, self.scope.bind(py)))?;
            if value.is_none() {
                Ok(None)
            } else {
                Ok(Some(value.extract::<String>()?))
            }
        })
    }

    fn swap_stdout(&mut self, target: &OutputTarget) -> Result<()> {
        Python::with_gil(|py| -> Result<()> {
            let sys = py.import("sys")?;
            match target {
                OutputTarget::Buffer(buffer) => {
                    if self.ambient_stdout.is_none() {
                        self.ambient_stdout = Some(sys.getattr("stdout")?.unbind());
                    }
                    let writer = Py::new(
                        py,
                        BufferWriter {
                            buffer: buffer.clone(),
                        },
                    )?;
                    sys.setattr("stdout", writer)?;
                }
                OutputTarget::Ambient => {
                    if let Some(stdout) = self.ambient_stdout.take() {
                        sys.setattr("stdout", stdout)?;
                    }
                }
            }
            Ok(())
        })
    }
}

impl ScriptInterpreter for PythonInterpreter {
    fn create_scope(&mut self) -> std::result::Result<(), InterpreterError> {
        self.scope = Python::with_gil(new_scope).map_err(PythonRuntimeError::from)?;
        Ok(())
    }

    fn set_variable(
        &mut self,
        name: &str,
        value: &serde_json::Value,
    ) -> std::result::Result<(), InterpreterError> {
        trace!(name, "Binding Python variable");
        Ok(self.bind(name, value)?)
    }

    fn run(&mut self, code: &str) -> std::result::Result<Option<String>, InterpreterError> {
        Ok(self.run_source(code)?)
    }

    fn redirect_output(
        &mut self,
        target: OutputTarget,
    ) -> std::result::Result<OutputTarget, InterpreterError> {
        self.swap_stdout(&target)?;
        Ok(std::mem::replace(&mut self.output, target))
    }
}

impl Drop for PythonInterpreter {
    fn drop(&mut self) {
        if let Some(stdout) = self.ambient_stdout.take() {
            Python::with_gil(|py| {
                if let Ok(sys) = py.import("sys") {
                    let _ = sys.setattr("stdout", stdout);
                }
            });
        }
    }
}

impl std::fmt::Debug for PythonInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonInterpreter")
            .field("output", &self.output)
            .field("redirected", &self.ambient_stdout.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
