use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use rca_config::Config;
use std::io::Read;
use tracing::{debug, warn};

use crate::runtime::Runtime;

#[derive(Debug, Clone, Parser)]
pub struct ExecCmd {
    /// Python code to run
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub code: Option<String>,

    /// Read the script from a file, or from stdin when "-"
    #[arg(long, short)]
    pub file: Option<Utf8PathBuf>,

    /// Print the report as JSON instead of the delimited text form
    #[arg(long)]
    pub json: bool,
}

impl ExecCmd {
    fn source(&self) -> Result<String> {
        match (&self.code, &self.file) {
            (Some(code), _) => Ok(code.clone()),
            (None, Some(path)) if path.as_str() == "-" => {
                let mut code = String::new();
                std::io::stdin()
                    .read_to_string(&mut code)
                    .context("Failed reading script from stdin")?;
                Ok(code)
            }
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed reading script: {path}")),
            (None, None) => anyhow::bail!("Nothing to run, pass code or --file"),
        }
    }

    pub(crate) async fn handle(&self, cfg: &Config) -> Result<()> {
        let code = self.source()?;
        debug!(bytes = code.len(), "Running script");

        let runtime = Runtime::start(cfg)?;
        let report = runtime.bridge().execute_report(&code).await;
        runtime.shutdown();

        let Some(report) = report else {
            warn!("Script is empty, nothing was run");
            return Ok(());
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report.render());
        }

        if !report.succeeded() {
            anyhow::bail!("Script failed");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_argument() {
        let cmd = ExecCmd {
            code: Some("print(1)".into()),
            file: None,
            json: false,
        };
        assert_eq!(cmd.source().unwrap(), "print(1)");
    }

    #[test]
    fn test_source_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("script.py")).unwrap();
        std::fs::write(&path, "x = 1\nx + 1\n").unwrap();

        let cmd = ExecCmd {
            code: None,
            file: Some(path),
            json: false,
        };
        assert_eq!(cmd.source().unwrap(), "x = 1\nx + 1\n");
    }

    #[test]
    fn test_source_missing_file() {
        let cmd = ExecCmd {
            code: None,
            file: Some(Utf8PathBuf::from("does/not/exist.py")),
            json: false,
        };
        let err = cmd.source().unwrap_err();
        assert!(err.to_string().contains("Failed reading script"));
    }
}
