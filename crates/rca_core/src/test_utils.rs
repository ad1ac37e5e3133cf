//! A tiny line-oriented interpreter for exercising the bridge without Python.
//!
//! Each line of a script is one command:
//!
//! - `print <text>` writes `<text>\n` to standard output
//! - `return <text>` sets the return value
//! - `let <var> <text>` stores `<text>` in the scope
//! - `get <var>.<field>` returns a variable, or a field of one
//! - `fail <message>` raises an error with `<message>`
//! - `sleep <ms>` blocks the owning thread

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::capture::OutputTarget;
use crate::error::InterpreterError;
use crate::interpreter::ScriptInterpreter;

/// Shared record of every call made on a [`ScriptedInterpreter`]
pub type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Default)]
pub struct ScriptedInterpreter {
    scope: serde_json::Map<String, serde_json::Value>,
    output: OutputTarget,
    ambient: Vec<String>,
    journal: Journal,
}

impl ScriptedInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    pub fn ambient_output(&self) -> Vec<String> {
        self.ambient.clone()
    }

    fn record(&self, event: String) {
        self.journal.lock().unwrap().push(event);
    }

    fn write(&mut self, text: String) {
        match &self.output {
            OutputTarget::Ambient => self.ambient.push(text),
            OutputTarget::Buffer(buffer) => buffer.write(&text),
        }
    }

    fn lookup(&self, path: &str) -> Result<String, InterpreterError> {
        let (var, field) = path.split_once('.').unwrap_or((path, ""));
        let value = self
            .scope
            .get(var)
            .ok_or_else(|| InterpreterError::new(format!("NameError: name '{var}' is not defined")))?;
        let value = if field.is_empty() { value } else { &value[field] };
        Ok(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl ScriptInterpreter for ScriptedInterpreter {
    fn create_scope(&mut self) -> Result<(), InterpreterError> {
        self.record("scope".into());
        self.scope.clear();
        Ok(())
    }

    fn set_variable(
        &mut self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<(), InterpreterError> {
        self.record(format!("set {name}"));
        self.scope.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn run(&mut self, code: &str) -> Result<Option<String>, InterpreterError> {
        self.record(format!("run {code}"));
        let mut returned = None;
        for line in code.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
            match command {
                "print" => self.write(format!("{arg}\n")),
                "return" => returned = Some(arg.to_string()),
                "let" => {
                    let (var, text) = arg.split_once(' ').unwrap_or((arg, ""));
                    self.scope
                        .insert(var.to_string(), serde_json::Value::String(text.to_string()));
                }
                "get" => returned = Some(self.lookup(arg)?),
                "fail" => return Err(InterpreterError::new(arg)),
                "sleep" => {
                    let ms = arg.parse().unwrap_or(0);
                    std::thread::sleep(Duration::from_millis(ms));
                }
                _ => {
                    return Err(InterpreterError::new(format!(
                        "SyntaxError: unknown command '{line}'"
                    )));
                }
            }
        }
        Ok(returned)
    }

    fn redirect_output(&mut self, target: OutputTarget) -> Result<OutputTarget, InterpreterError> {
        let label = match target {
            OutputTarget::Ambient => "ambient",
            OutputTarget::Buffer(_) => "buffer",
        };
        self.record(format!("redirect {label}"));
        Ok(std::mem::replace(&mut self.output, target))
    }
}
