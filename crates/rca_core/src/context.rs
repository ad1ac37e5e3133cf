//! Storage for the host's active session
//!
//! The host replaces the stored handle whenever a command runs, from whatever thread it
//! happens to be on. The bridge reads it again for every request once that request is
//! on the owning thread, so a request never runs against a stale session.

use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::error::{BridgeError, SessionError};

/// Script variables keyed by the fixed names scripts refer to them by
pub type SessionBindings = IndexMap<String, serde_json::Value>;

/// A host session that can expose itself to scripts.
///
/// `bindings` is only ever called on the owning thread.
pub trait HostSession: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns an error if the session cannot currently be exposed, e.g. no document is open
    fn bindings(&self) -> Result<SessionBindings, SessionError>;
}

pub struct ContextStore<S> {
    active: RwLock<Option<Arc<S>>>,
}

impl<S: HostSession> ContextStore<S> {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }

    /// Replace the active session
    pub fn set_active_session(&self, session: Arc<S>) {
        debug!("Active host session replaced");
        *self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn active_session(&self) -> Option<Arc<S>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The active session, or [`BridgeError::ContextNotSet`] when none was ever set
    ///
    /// # Errors
    ///
    /// Fails when no session is stored
    pub fn require_active_session(&self) -> Result<Arc<S>, BridgeError> {
        self.active_session().ok_or(BridgeError::ContextNotSet)
    }

    /// Forget the active session
    pub fn clear(&self) {
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl<S: HostSession> Default for ContextStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for ContextStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let is_set = self
            .active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("ContextStore")
            .field("active", &is_set)
            .finish()
    }
}
