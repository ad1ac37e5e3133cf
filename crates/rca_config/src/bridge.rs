use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Settings for the script bridge and the thread that owns the interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Maximum number of requests waiting for the owning thread.
    /// Unbounded when absent; a full queue rejects new requests with an error report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,

    /// Name given to the owning thread when rca hosts it itself
    #[serde(default = "crate::defaults::default_thread_name")]
    pub thread_name: String,

    /// Extra directories appended to the interpreter's module search path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<Utf8PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: None,
            thread_name: crate::defaults::default_thread_name(),
            search_paths: Vec::new(),
        }
    }
}
