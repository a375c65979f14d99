//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the server config and a map of live editor sessions. Each session
//! owns one `EditorStore`; the lock is held only for the synchronous store
//! call, never across an await.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use stencil::store::EditorStore;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;

// =============================================================================
// EDITOR SESSION
// =============================================================================

/// One open editor document.
pub struct EditorSession {
    pub store: EditorStore,
    /// Last time a request touched this session. Drives idle eviction.
    pub last_seen: Instant,
}

impl EditorSession {
    #[must_use]
    pub fn new(store: EditorStore) -> Self {
        Self { store, last_seen: Instant::now() }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<RwLock<HashMap<Uuid, EditorSession>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config: Arc::new(config), sessions: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
