use rca_config::logger::{LogLevel, LoggerConfig, LoggerFormat};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::utils::jsonl_logger::{JsonlLayer, JsonlWriter};

const WHITELISTED_CRATES: &[&str] = &["rca", "rca_config", "rca_core", "rca_python_runtime"];

pub(crate) fn default_env_filter(cfg: &LoggerConfig, level: LogLevel) -> String {
    let mut filters: Vec<String> = WHITELISTED_CRATES
        .iter()
        .map(|crate_name| format!("{crate_name}={level}"))
        .collect();

    // Set default level for all other crates to warn
    filters.insert(0, "warn".to_string());
    filters.extend(cfg.session_log_directive());

    filters.join(",")
}

/// Level to log at: command line flags win over the config file
pub(crate) fn effective_level(cfg: &LoggerConfig, quiet: bool, verbose: u8) -> Option<LogLevel> {
    match LogLevel::from_flags(quiet, verbose) {
        Some(level) => Some(level),
        None if cfg.enabled => Some(cfg.level),
        None => None,
    }
}

fn console_layer(
    cfg: &LoggerConfig,
    level: LogLevel,
) -> Box<dyn Layer<Registry> + Send + Sync + 'static> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg.colors);

    match cfg.format {
        // For INFO and above, keep lines short: no timestamps or targets
        LoggerFormat::Compact if level >= LogLevel::Info => layer
            .compact()
            .without_time()
            .with_target(false)
            .boxed(),
        LoggerFormat::Compact => layer.compact().boxed(),
        LoggerFormat::Pretty => layer.pretty().boxed(),
        LoggerFormat::Json => layer.json().boxed(),
    }
}

pub(crate) fn init_logger(cfg: &LoggerConfig, quiet: bool, verbose: u8) {
    let Some(level) = effective_level(cfg, quiet, verbose) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_env_filter(cfg, level)));

    let file_layer = cfg.file.as_ref().and_then(|path| match JsonlWriter::new(path) {
        Ok(writer) => Some(JsonlLayer::new(writer)),
        Err(e) => {
            eprintln!("rca: Failed opening log file {path}: {e}");
            None
        }
    });

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer(cfg, level))
        .with(file_layer)
        .with(filter)
        .try_init()
    {
        eprintln!("rca: Failed initializing logger: {e:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_env_filter() {
        assert_eq!(
            default_env_filter(&LoggerConfig::default(), LogLevel::Debug),
            "warn,rca=debug,rca_config=debug,rca_core=debug,rca_python_runtime=debug"
        );
    }

    #[test]
    fn test_env_filter_echoes_session_log() {
        let cfg = LoggerConfig {
            echo_session_log: true,
            ..LoggerConfig::default()
        };

        assert!(
            default_env_filter(&cfg, LogLevel::Info)
                .ends_with(",rca_python_runtime=info,rca::log=debug")
        );
    }

    #[test]
    fn test_flags_override_config() {
        let cfg = LoggerConfig {
            level: LogLevel::Error,
            ..LoggerConfig::default()
        };

        assert_eq!(effective_level(&cfg, false, 0), Some(LogLevel::Error));
        assert_eq!(effective_level(&cfg, false, 1), Some(LogLevel::Debug));
        assert_eq!(effective_level(&cfg, true, 0), Some(LogLevel::Warn));
    }

    #[test]
    fn test_disabled_logger_can_be_forced_on() {
        let cfg = LoggerConfig {
            enabled: false,
            ..LoggerConfig::default()
        };

        assert_eq!(effective_level(&cfg, false, 0), None);
        assert_eq!(effective_level(&cfg, false, 2), Some(LogLevel::Trace));
    }
}
