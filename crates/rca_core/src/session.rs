//! Document-centric host session model.
//!
//! Scripts see the session as three variables:
//!
//! - `uiapp`: the application, with `ApplicationName` and `ActiveUIDocument`
//! - `uidoc`: the active UI document, with `Document`
//! - `doc`: the active document itself (`Title`, `PathName`, `IsModified`)

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::{HostSession, SessionBindings};
use crate::error::SessionError;

pub const UIAPP_BINDING: &str = "uiapp";
pub const UIDOC_BINDING: &str = "uidoc";
pub const DOC_BINDING: &str = "doc";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    pub title: String,
    #[serde(rename = "PathName")]
    pub path: Option<String>,
    pub is_modified: bool,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: None,
            is_modified: false,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSession {
    application: String,
    active_document: Option<Document>,
}

impl DocumentSession {
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            active_document: None,
        }
    }

    #[must_use]
    pub fn with_document(mut self, document: Document) -> Self {
        self.active_document = Some(document);
        self
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active_document.as_ref()
    }
}

impl HostSession for DocumentSession {
    fn bindings(&self) -> Result<SessionBindings, SessionError> {
        let document = self
            .active_document
            .as_ref()
            .ok_or(SessionError::NoActiveDocument)?;
        let doc = serde_json::to_value(document)?;
        let uidoc = json!({ "Document": doc });
        let uiapp = json!({
            "ApplicationName": self.application,
            "ActiveUIDocument": uidoc,
        });

        let mut bindings = SessionBindings::new();
        bindings.insert(UIAPP_BINDING.to_string(), uiapp);
        bindings.insert(UIDOC_BINDING.to_string(), uidoc);
        bindings.insert(DOC_BINDING.to_string(), doc);
        Ok(bindings)
    }
}
