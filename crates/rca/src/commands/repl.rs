use anyhow::Result;
use clap::Parser;
use rca_config::Config;
use rca_core::{LogEntry, LogKind};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::{
    runtime::{PythonBridge, Runtime},
    utils::styles::{fmt_bold, fmt_dimmed, fmt_error, fmt_red, fmt_yellow},
};

const PROMPT: &str = ">>> ";
const CONTINUATION_PROMPT: &str = "... ";

#[derive(Debug, Clone, Parser)]
pub struct ReplCmd {
    /// Don't print the banner on start
    #[arg(long)]
    pub no_banner: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Log,
    Clear,
    Reset,
    Quit,
    Help,
}

impl ReplCommand {
    /// Parse a `:command` line, `Err` holds the unrecognised name
    pub(crate) fn parse(line: &str) -> Option<std::result::Result<Self, String>> {
        let name = line.trim().strip_prefix(':')?;
        Some(match name {
            "log" | "l" => Ok(Self::Log),
            "clear" | "c" => Ok(Self::Clear),
            "reset" | "r" => Ok(Self::Reset),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            "help" | "h" | "?" => Ok(Self::Help),
            other => Err(other.to_string()),
        })
    }
}

/// Collects input lines until a complete statement is available.
///
/// A line ending in `:` opens a block that runs once an empty line is entered.
#[derive(Debug, Default)]
pub(crate) struct InputBuffer {
    lines: Vec<String>,
}

impl InputBuffer {
    pub(crate) fn push(&mut self, line: &str) -> Option<String> {
        if self.lines.is_empty() {
            if line.trim_end().ends_with(':') {
                self.lines.push(line.to_string());
                return None;
            }
            return Some(line.to_string());
        }

        if line.trim().is_empty() {
            return Some(std::mem::take(&mut self.lines).join("\n"));
        }
        self.lines.push(line.to_string());
        None
    }

    pub(crate) fn is_continuation(&self) -> bool {
        !self.lines.is_empty()
    }

    pub(crate) fn reset(&mut self) {
        self.lines.clear();
    }
}

fn prompt(buffer: &InputBuffer) {
    let prompt = if buffer.is_continuation() {
        CONTINUATION_PROMPT
    } else {
        PROMPT
    };
    print!("{prompt}");
    let _ = std::io::stdout().flush();
}

fn format_entry(entry: &LogEntry) -> String {
    let stamp = fmt_dimmed(&entry.timestamp().format("%H:%M:%S").to_string());
    let message = match entry.kind() {
        LogKind::Error => fmt_red(entry.message()),
        LogKind::Warning => fmt_yellow(entry.message()),
        LogKind::Info => fmt_dimmed(entry.message()),
        LogKind::ScriptOutput => entry.message().to_string(),
    };
    format!("{stamp} {message}")
}

fn print_help() {
    println!("{}", fmt_bold("Commands:"));
    println!("  :log    show the session log");
    println!("  :clear  clear the session log");
    println!("  :reset  forget variables defined by earlier input");
    println!("  :quit   leave the repl");
    println!("  :help   show this message");
}

impl ReplCmd {
    pub(crate) async fn handle(&self, cfg: &Config) -> Result<()> {
        let runtime = Runtime::start(cfg)?;

        if !self.no_banner {
            println!(
                "{} {}",
                fmt_bold("rca"),
                fmt_dimmed(&format!(
                    "v{} (type :help for commands)",
                    env!("CARGO_PKG_VERSION")
                ))
            );
        }

        let result = Self::run_loop(runtime.bridge()).await;
        runtime.shutdown();
        result
    }

    async fn run_loop(bridge: &PythonBridge) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut buffer = InputBuffer::default();

        loop {
            prompt(&buffer);

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    buffer.reset();
                    continue;
                }
            };
            let Some(line) = line else {
                println!();
                break;
            };

            if !buffer.is_continuation() {
                match ReplCommand::parse(&line) {
                    Some(Ok(ReplCommand::Quit)) => break,
                    Some(Ok(ReplCommand::Log)) => {
                        for entry in bridge.log().entries() {
                            println!("{}", format_entry(&entry));
                        }
                        continue;
                    }
                    Some(Ok(ReplCommand::Clear)) => {
                        bridge.log().clear();
                        info!("Session log cleared");
                        continue;
                    }
                    Some(Ok(ReplCommand::Reset)) => {
                        match bridge.reset_scope().await {
                            Ok(()) => info!("Interpreter scope reset"),
                            Err(e) => println!("{}", fmt_error(&e.to_string())),
                        }
                        continue;
                    }
                    Some(Ok(ReplCommand::Help)) => {
                        print_help();
                        continue;
                    }
                    Some(Err(name)) => {
                        println!("{}", fmt_error(&format!("Unknown command :{name}")));
                        continue;
                    }
                    None => {}
                }
            }

            let Some(code) = buffer.push(&line) else {
                continue;
            };
            debug!(lines = code.lines().count(), "Submitting repl input");
            print!("{}", bridge.execute(&code).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse(":log"), Some(Ok(ReplCommand::Log)));
        assert_eq!(ReplCommand::parse("  :clear "), Some(Ok(ReplCommand::Clear)));
        assert_eq!(ReplCommand::parse(":q"), Some(Ok(ReplCommand::Quit)));
        assert_eq!(ReplCommand::parse(":reset"), Some(Ok(ReplCommand::Reset)));
        assert_eq!(ReplCommand::parse(":r"), Some(Ok(ReplCommand::Reset)));
        assert_eq!(
            ReplCommand::parse(":bogus"),
            Some(Err("bogus".to_string()))
        );
        assert_eq!(ReplCommand::parse("print(':log')"), None);
    }

    #[test]
    fn test_single_line_runs_immediately() {
        let mut buffer = InputBuffer::default();
        assert_eq!(buffer.push("x = 1"), Some("x = 1".to_string()));
        assert!(!buffer.is_continuation());
    }

    #[test]
    fn test_block_runs_after_blank_line() {
        let mut buffer = InputBuffer::default();
        assert_eq!(buffer.push("for i in range(3):"), None);
        assert!(buffer.is_continuation());
        assert_eq!(buffer.push("    print(i)"), None);
        assert_eq!(
            buffer.push(""),
            Some("for i in range(3):\n    print(i)".to_string())
        );
        assert!(!buffer.is_continuation());
    }

    #[test]
    fn test_reset_drops_partial_block() {
        let mut buffer = InputBuffer::default();
        buffer.push("if True:");
        buffer.reset();
        assert_eq!(buffer.push("1"), Some("1".to_string()));
    }
}
