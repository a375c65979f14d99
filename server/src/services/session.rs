//! Editor session service: open, access, close and evict.
//!
//! DESIGN
//! ======
//! Sessions live only in memory. Every access goes through `with_session`,
//! which takes the write lock, refreshes the idle clock and runs one
//! synchronous store call. Nothing awaits while the lock is held.

use std::time::Instant;

use stencil::store::EditorStore;
use tracing::info;
use uuid::Uuid;

use crate::error::{self, ApiError};
use crate::state::{AppState, EditorSession};

/// Parse `svg` into a new editor session. Returns the session id and the
/// number of editable elements.
///
/// # Errors
///
/// Rejects oversized or malformed documents and refuses new sessions once
/// the configured limit is reached.
pub async fn open_session(state: &AppState, svg: &str) -> Result<(Uuid, usize), ApiError> {
    error::check_svg_size(svg, state.config.max_svg_bytes)?;
    let mut store = EditorStore::new();
    let count = store.load(svg)?;

    let mut sessions = state.sessions.write().await;
    if sessions.len() >= state.config.max_sessions {
        return Err(ApiError::TooManySessions(state.config.max_sessions));
    }
    let id = Uuid::new_v4();
    sessions.insert(id, EditorSession::new(store));
    info!(session_id = %id, elements = count, open = sessions.len(), "editor session opened");
    Ok((id, count))
}

/// Run `f` against a session's store.
///
/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown id, or whatever `f`
/// returns.
pub async fn with_session<T>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut EditorStore) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
    session.touch();
    f(&mut session.store)
}

/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown id.
pub async fn close_session(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    let removed = state.sessions.write().await.remove(&id);
    if removed.is_none() {
        return Err(ApiError::SessionNotFound(id));
    }
    info!(session_id = %id, "editor session closed");
    Ok(())
}

/// Drop sessions idle for at least the configured TTL as of `now`.
/// Returns how many were evicted.
pub async fn evict_idle(state: &AppState, now: Instant) -> usize {
    let ttl = state.config.session_ttl;
    let mut sessions = state.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|id, session| {
        let keep = now.saturating_duration_since(session.last_seen) < ttl;
        if !keep {
            info!(session_id = %id, "editor session expired");
        }
        keep
    });
    before - sessions.len()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
