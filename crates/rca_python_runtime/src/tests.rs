use std::sync::Arc;

use rca_core::session::{Document, DocumentSession};
use rca_core::{
    HostThread, LogKind, LogSink, OutputBuffer, OutputTarget, ScriptBridge, ScriptInterpreter,
    queue,
};
use serial_test::serial;

use super::*;

type PythonBridge = ScriptBridge<DocumentSession, PythonInterpreter>;

fn start_bridge() -> (PythonBridge, HostThread) {
    let (queue, pump) = queue::channel(None);
    let host = HostThread::spawn("rca-python-test", pump, PythonInterpreter::new).unwrap();
    (ScriptBridge::new(queue, LogSink::new()), host)
}

fn session(title: &str) -> Arc<DocumentSession> {
    Arc::new(DocumentSession::new("Test Host").with_document(Document::new(title)))
}

#[test]
#[serial]
fn test_last_expression_is_returned() {
    let mut python = PythonInterpreter::new().unwrap();

    assert_eq!(python.run("2 + 2").unwrap(), Some("4".to_string()));
    assert_eq!(python.run("x = 5").unwrap(), None);
    assert_eq!(python.run("x = 5\nx * 3").unwrap(), Some("15".to_string()));
    assert_eq!(python.run("None").unwrap(), None);
    assert_eq!(python.run("'a' == 'a'").unwrap(), Some("True".to_string()));
}

#[test]
#[serial]
fn test_create_scope_discards_variables() {
    let mut python = PythonInterpreter::new().unwrap();
    python.run("leftover = 1").unwrap();
    assert_eq!(python.run("leftover").unwrap(), Some("1".to_string()));

    python.create_scope().unwrap();
    let err = python.run("leftover").unwrap_err();
    assert!(err.message().contains("NameError"), "got: {}", err.message());
}

#[test]
#[serial]
fn test_bindings_support_attribute_access() {
    let mut python = PythonInterpreter::new().unwrap();
    python
        .set_variable(
            "doc",
            &serde_json::json!({ "Title": "Tower A", "Levels": [1, 2, 3], "Info": { "Phase": "DD" } }),
        )
        .unwrap();

    assert_eq!(python.run("doc.Title").unwrap(), Some("Tower A".to_string()));
    assert_eq!(python.run("len(doc.Levels)").unwrap(), Some("3".to_string()));
    assert_eq!(python.run("doc.Info.Phase").unwrap(), Some("DD".to_string()));
}

#[test]
#[serial]
fn test_syntax_error_message() {
    let mut python = PythonInterpreter::new().unwrap();

    let err = python.run("def broken(:\n    pass").unwrap_err();
    assert!(err.message().contains("SyntaxError"), "got: {}", err.message());
}

#[test]
#[serial]
fn test_redirect_and_restore_stdout() {
    let mut python = PythonInterpreter::new().unwrap();
    let buffer = OutputBuffer::default();

    let previous = python
        .redirect_output(OutputTarget::Buffer(buffer.clone()))
        .unwrap();
    assert!(matches!(previous, OutputTarget::Ambient));

    python.run("print('captured')").unwrap();
    assert_eq!(buffer.contents(), "captured\n");

    python.redirect_output(previous).unwrap();
    assert_eq!(
        python.run("import sys\nsys.stdout is sys.__stdout__").unwrap(),
        Some("True".to_string())
    );

    python.run("print('not captured')").unwrap();
    assert_eq!(buffer.contents(), "captured\n");
}

#[test]
#[serial]
fn test_search_paths_are_appended() {
    let dir = std::env::temp_dir().join("rca-python-search-path");
    let path = dir.to_string_lossy().to_string();
    let mut python = PythonInterpreter::with_search_paths(&[path.as_str()]).unwrap();

    let found = python
        .run(&format!("import sys\n{path:?} in sys.path"))
        .unwrap();
    assert_eq!(found, Some("True".to_string()));
}

#[tokio::test]
#[serial]
async fn test_bridge_print_round_trip() {
    let (bridge, _host) = start_bridge();
    bridge.set_session(session("A"));

    let text = bridge.execute("print('X')").await;
    assert_eq!(
        text,
        "--- [PYTHON EXECUTION START] ---\nOutput: X\n--- [PYTHON EXECUTION END] ---\n"
    );

    let entries = bridge.log().entries();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.kind() == LogKind::ScriptOutput));
}

#[tokio::test]
#[serial]
async fn test_bridge_return_value() {
    let (bridge, _host) = start_bridge();
    bridge.set_session(session("A"));

    let report = bridge.execute_report("2 + 2").await.unwrap();
    assert_eq!(report.body(), "Return value: 4");

    let report = bridge
        .execute_report("print('hello')\nlen('four')")
        .await
        .unwrap();
    assert_eq!(report.body(), "hello\nReturn value: 4");

    let report = bridge.execute_report("x = 1").await.unwrap();
    assert_eq!(report.body(), "(no output)");
}

#[tokio::test]
#[serial]
async fn test_bridge_errors_are_reported() {
    let (bridge, _host) = start_bridge();
    bridge.set_session(session("A"));

    let text = bridge.execute("def broken(:").await;
    assert!(text.starts_with("--- [PYTHON ERROR OUTPUT START] ---\n"));
    assert!(text.contains("Python Error: SyntaxError"));

    let report = bridge.execute_report("raise ValueError('bad value')").await.unwrap();
    assert!(!report.succeeded());
    assert_eq!(report.body(), "ValueError: bad value");

    // output is back on the ambient stream after a failure
    let restored = Python::with_gil(|py| -> PyResult<bool> {
        let sys = py.import("sys")?;
        Ok(sys.getattr("stdout")?.is(&sys.getattr("__stdout__")?))
    })
    .unwrap();
    assert!(restored);
}

#[tokio::test]
#[serial]
async fn test_bridge_strips_nul_characters() {
    let (bridge, _host) = start_bridge();
    bridge.set_session(session("A"));

    let report = bridge.execute_report("print('a\\x00b')").await.unwrap();
    assert_eq!(report.body(), "ab");
}

#[tokio::test]
#[serial]
async fn test_bridge_follows_session_switch() {
    let (bridge, _host) = start_bridge();

    bridge.set_session(session("Session A"));
    let first = bridge.execute_report("doc.Title").await.unwrap();
    assert_eq!(first.body(), "Return value: Session A");

    bridge.set_session(session("Session B"));
    let second = bridge
        .execute_report("print(uidoc.Document.Title)\nuiapp.ApplicationName")
        .await
        .unwrap();
    assert_eq!(second.body(), "Session B\nReturn value: Test Host");
}

#[tokio::test]
#[serial]
async fn test_bridge_keeps_variables_between_runs() {
    let (bridge, _host) = start_bridge();
    bridge.set_session(session("A"));

    bridge.execute("x = 41").await;
    let report = bridge.execute_report("x + 1").await.unwrap();
    assert_eq!(report.body(), "Return value: 42");

    bridge.set_session(session("B"));
    let report = bridge
        .execute_report("f'{doc.Title} {x}'")
        .await
        .unwrap();
    assert_eq!(report.body(), "Return value: B 41");

    bridge.reset_scope().await.unwrap();
    let report = bridge.execute_report("x").await.unwrap();
    assert_eq!(report.body(), "NameError: name 'x' is not defined");
}

#[tokio::test]
#[serial]
async fn test_bridge_without_context() {
    let (bridge, _host) = start_bridge();

    let report = bridge.execute_report("print('X')").await.unwrap();
    assert!(!report.succeeded());
    assert_eq!(
        report.body(),
        "Host context not set. Call set_context() first."
    );
}
