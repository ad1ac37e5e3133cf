//! Stands up the bridge for the CLI: a log, a host thread owning the Python
//! interpreter, and a document session built from config.

use anyhow::{Context, Result};
use rca_config::{Config, session::SessionConfig};
use rca_core::session::{Document, DocumentSession};
use rca_core::{HostThread, LogSink, ScriptBridge, debug_info, queue};
use rca_python_runtime::PythonInterpreter;
use std::sync::Arc;
use tracing::{debug, warn};

pub type PythonBridge = ScriptBridge<DocumentSession, PythonInterpreter>;

pub struct Runtime {
    bridge: PythonBridge,
    host: HostThread,
}

impl Runtime {
    /// Spawn the owning thread and bind the configured session.
    ///
    /// # Errors
    ///
    /// Returns an error if the owning thread cannot be spawned
    pub fn start(cfg: &Config) -> Result<Self> {
        let log = LogSink::new();
        if !debug_info::install(log.clone()) {
            debug!("Process log already installed, keeping the existing one");
        }

        let (queue, pump) = queue::channel(cfg.bridge.queue_capacity);
        let search_paths: Vec<String> = cfg
            .bridge
            .search_paths
            .iter()
            .map(ToString::to_string)
            .collect();
        let host = HostThread::spawn(cfg.bridge.thread_name.clone(), pump, move || {
            PythonInterpreter::with_search_paths(&search_paths)
        })
        .context("Failed spawning host thread")?;

        let bridge = ScriptBridge::new(queue, log);
        let session = session_from_config(&cfg.session);
        match session.active_document() {
            Some(doc) => debug_info::write(&format!(
                "Session ready: {} / {}",
                session.application(),
                doc.title
            )),
            None => debug_info::write_warning(&format!(
                "Session ready: {} has no active document",
                session.application()
            )),
        }
        bridge.set_session(Arc::new(session));

        Ok(Self { bridge, host })
    }

    pub fn bridge(&self) -> &PythonBridge {
        &self.bridge
    }

    /// Close the queue and wait for the owning thread to drain it
    pub fn shutdown(self) {
        let Self { bridge, host } = self;
        drop(bridge);

        let name = host.name().to_string();
        match host.join() {
            Ok(handled) => debug!(thread = %name, handled, "Host thread stopped"),
            Err(_) => warn!(thread = %name, "Host thread panicked"),
        }
    }
}

pub fn session_from_config(cfg: &SessionConfig) -> DocumentSession {
    let session = DocumentSession::new(cfg.application.clone());
    match &cfg.document_title {
        Some(title) => {
            let mut document = Document::new(title.clone());
            if let Some(path) = &cfg.document_path {
                document = document.with_path(path.as_str());
            }
            session.with_document(document)
        }
        None => session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_default_session_has_document() {
        let session = session_from_config(&SessionConfig::default());

        assert_eq!(session.application(), "RCA Host");
        assert_eq!(
            session.active_document().map(|d| d.title.as_str()),
            Some("Untitled")
        );
    }

    #[test]
    fn test_session_with_path() {
        let cfg = SessionConfig {
            application: "Designer".into(),
            document_title: Some("Tower A".into()),
            document_path: Some(Utf8PathBuf::from("/models/tower-a.rvt")),
        };
        let session = session_from_config(&cfg);

        let doc = session.active_document().unwrap();
        assert_eq!(doc.title, "Tower A");
        assert_eq!(doc.path.as_deref(), Some("/models/tower-a.rvt"));
    }

    #[test]
    fn test_session_without_document() {
        let cfg = SessionConfig {
            document_title: None,
            ..SessionConfig::default()
        };

        assert!(session_from_config(&cfg).active_document().is_none());
    }

    #[tokio::test]
    async fn test_runtime_runs_scripts_against_configured_session() {
        let mut cfg = Config::default();
        cfg.session.document_title = Some("Tower A".into());

        let runtime = Runtime::start(&cfg).unwrap();
        let report = runtime
            .bridge()
            .execute_report("print(doc.Title)\nuiapp.ApplicationName")
            .await
            .unwrap();
        assert_eq!(report.body(), "Tower A\nReturn value: RCA Host");

        let entries = runtime.bridge().log().entries();
        assert!(entries[0].message().contains("Session ready: RCA Host / Tower A"));
        assert_eq!(entries.len(), 4);

        runtime.shutdown();
    }
}
