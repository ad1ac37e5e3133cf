pub mod commands;
pub mod runtime;
pub mod utils;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::{
    commands::{exec::ExecCmd, init::InitCmd, repl::ReplCmd},
    utils::logger::init_logger,
};
use rca_config::Config;

#[derive(Parser)]
#[command(name = "rca")]
#[command(version)]
#[command(about = "RCA - Python scripting for host sessions")]
#[command(
    long_about = "RCA runs Python scripts on the single thread that owns the host session. \
Scripts see the session as `uiapp`, `uidoc` and `doc`, and every run produces a report \
of its output and return value that is also kept in the session log."
)]
#[command(after_help = "EXAMPLES:\n  \
    rca init\n  \
    rca exec \"print(doc.Title)\"\n  \
    rca exec --file script.py\n  \
    rca repl\n\
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path, defaults to ./rca.json
    #[arg(long, short = 'c', global = true, default_value_t = Config::default_path())]
    pub config: Utf8PathBuf,

    /// No logging except for warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verbose logging (-v) or trace logging (-vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    #[allow(clippy::missing_errors_doc)]
    pub async fn handle(&self) -> anyhow::Result<()> {
        let cfg = Config::load_or_default(&self.config);

        let logger = cfg
            .as_ref()
            .map(|c| c.logger.clone())
            .unwrap_or_default();
        init_logger(&logger, self.quiet, self.verbose);

        match &self.command {
            Commands::Init(cmd) => {
                cmd.handle(&self.config)?;
            }
            Commands::Exec(cmd) => cmd.handle(&cfg?).await?,
            Commands::Repl(cmd) => cmd.handle(&cfg?).await?,
        }

        Ok(())
    }
}

#[derive(Debug, Subcommand)]
#[command(styles=utils::styles::get_styles())]
pub enum Commands {
    /// Initialize configuration file
    #[command(long_about = "Initialize rca.json configuration file.")]
    Init(InitCmd),

    /// Run a script and print its report
    #[command(
        long_about = "Run Python code given inline or read from a file, and print the execution report. \
Exits with a non-zero status if the script failed."
    )]
    Exec(ExecCmd),

    /// Start an interactive session
    #[command(
        long_about = "Read Python from stdin line by line and run each statement on the host thread. \
Blocks opened with a trailing ':' run once an empty line is entered. \
Variables persist between inputs until :reset. \
Use :log to show the session log, :clear to empty it and :quit to leave."
    )]
    Repl(ReplCmd),
}
