//! Shared application state handed to every request handler.

use crate::workspace::SessionStore;

/// State shared by the HTTP handlers.
///
/// Holds no session data of its own; the store reads the filesystem on
/// every call.
#[derive(Debug, Clone)]
pub struct AppState {
    store: SessionStore,
}

impl AppState {
    /// Wraps a session store.
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// The session store.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
