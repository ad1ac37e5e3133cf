use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use tracing::debug;

use crate::{bridge::BridgeConfig, logger::LoggerConfig, session::SessionConfig};

pub mod bridge;
pub(crate) mod defaults;
pub mod logger;
pub mod session;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing)]
    path: Option<Utf8PathBuf>,

    /// Name of this rca installation
    #[serde(default = "crate::defaults::default_name")]
    pub name: String,

    /// Version of the config schema
    #[serde(default = "crate::defaults::default_version")]
    pub version: String,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Script bridge configuration
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Host session the CLI hands to the bridge
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            name: crate::defaults::default_name(),
            version: crate::defaults::default_version(),
            logger: LoggerConfig::default(),
            bridge: BridgeConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_path(mut self, path: &Utf8PathBuf) -> Self {
        self.path = Some(path.clone());
        self
    }

    pub fn path(&self) -> Utf8PathBuf {
        self.path.clone().unwrap_or(Self::default_path())
    }

    /// Loads config from json file
    ///
    /// # Errors
    ///
    /// This function will return an error if the config path does not exist or the content is invalid
    pub fn load(path: &Utf8PathBuf) -> Result<Self> {
        debug!("Loading config from {path}");

        if !path.exists() {
            anyhow::bail!("Config file does not exist: {path}");
        }

        let contents =
            fs::read_to_string(path).context(format!("Failed reading config: {path} "))?;

        let mut cfg: Self =
            serde_json::from_str(&contents).context(format!("Failed loading config: {path} "))?;
        cfg.path = Some(path.clone());

        Ok(cfg)
    }

    /// Loads config from `path` if it exists, otherwise returns the defaults
    /// bound to that path.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file exists but cannot be read or parsed
    pub fn load_or_default(path: &Utf8PathBuf) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {path}, using defaults");
            Ok(Self::default().with_path(path))
        }
    }

    /// Saves config to json file, falling back on default path if none is provided
    ///
    /// # Errors
    /// This function will error if it fails writing the config
    pub fn save(&self) -> Result<()> {
        let dest = self.path();
        debug!("Saving config to {dest}");
        let contents = serde_json::to_string_pretty(self).unwrap_or(json!(self).to_string());

        fs::write(&dest, contents).context(format!("Failed writing config: {dest}"))?;

        Ok(())
    }

    /// Default config path is ./rca.json
    pub fn default_path() -> Utf8PathBuf {
        Utf8PathBuf::new().join("rca.json")
    }
}
