use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use rca_config::Config;
use tracing::info;

use crate::{
    commands::USER_CANCELLED,
    utils::styles::{fmt_bold, fmt_dimmed, fmt_success},
};

#[derive(Debug, Clone, Parser)]
pub struct InitCmd {
    /// Overwrite an existing config without asking
    #[arg(long, short)]
    pub yes: bool,

    /// Title of the document scripts see as `doc`
    #[arg(long)]
    pub document: Option<String>,

    /// Start with no active document
    #[arg(long, conflicts_with = "document")]
    pub no_document: bool,
}

impl InitCmd {
    pub(crate) fn handle(&self, path: &Utf8PathBuf) -> Result<Config> {
        if path.exists() && !self.yes {
            let overwrite = inquire::Confirm::new(&format!(
                "An rca config already exists at {}, overwrite it?",
                fmt_dimmed(path.as_str())
            ))
            .with_default(false)
            .prompt()?;
            if !overwrite {
                anyhow::bail!(USER_CANCELLED)
            }
        }

        let cfg = self.build(path);
        cfg.save()?;

        info!(
            "{}",
            fmt_success(&format!("Created config at {}", fmt_bold(path.as_str())))
        );

        Ok(cfg)
    }

    fn build(&self, path: &Utf8PathBuf) -> Config {
        let mut cfg = Config::default().with_path(path);

        cfg.name = std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|f| f.to_string_lossy().to_string()))
            .unwrap_or("rca".into());

        if self.no_document {
            cfg.session.document_title = None;
        } else if let Some(title) = &self.document {
            cfg.session.document_title = Some(title.clone());
        }

        cfg
    }
}
