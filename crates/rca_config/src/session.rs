use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Description of the host session the CLI stands up for scripts.
///
/// Scripts see it through the `uiapp`, `uidoc` and `doc` bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "crate::defaults::default_application")]
    pub application: String,

    /// Title of the active document. No document is open when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_path: Option<Utf8PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            application: crate::defaults::default_application(),
            document_title: Some("Untitled".into()),
            document_path: None,
        }
    }
}
