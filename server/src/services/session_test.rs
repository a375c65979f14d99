use std::time::Duration;

use super::*;
use crate::state::test_helpers::{self, TEMPLATE};

// =============================================================================
// open / close
// =============================================================================

#[tokio::test]
async fn open_session_loads_the_document() {
    let state = test_helpers::test_app_state();
    let (id, count) = open_session(&state, TEMPLATE).await.unwrap();
    assert_eq!(count, 5);
    let order = with_session(&state, id, |store| Ok(store.order().to_vec())).await.unwrap();
    assert_eq!(order[0], "Name.text.max_20");
}

#[tokio::test]
async fn open_session_rejects_malformed_svg() {
    let state = test_helpers::test_app_state();
    let err = open_session(&state, "<svg><g></svg>").await.unwrap_err();
    assert!(matches!(err, ApiError::Store(_)));
    assert!(state.sessions.read().await.is_empty());
}

#[tokio::test]
async fn open_session_enforces_size_limit() {
    let state = test_helpers::test_app_state_with(|c| c.max_svg_bytes = 16);
    let err = open_session(&state, TEMPLATE).await.unwrap_err();
    assert!(matches!(err, ApiError::PayloadTooLarge { limit: 16, .. }));
}

#[tokio::test]
async fn open_session_enforces_session_limit() {
    let state = test_helpers::test_app_state_with(|c| c.max_sessions = 1);
    open_session(&state, TEMPLATE).await.unwrap();
    let err = open_session(&state, TEMPLATE).await.unwrap_err();
    assert!(matches!(err, ApiError::TooManySessions(1)));
}

#[tokio::test]
async fn close_session_removes_it_once() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state).await;
    close_session(&state, id).await.unwrap();
    assert!(matches!(close_session(&state, id).await, Err(ApiError::SessionNotFound(_))));
}

// =============================================================================
// with_session
// =============================================================================

#[tokio::test]
async fn with_session_unknown_id_is_not_found() {
    let state = test_helpers::test_app_state();
    let result = with_session(&state, Uuid::new_v4(), |_| Ok(())).await;
    assert!(matches!(result, Err(ApiError::SessionNotFound(_))));
}

#[tokio::test]
async fn with_session_refreshes_idle_clock() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state).await;
    let before = state.sessions.read().await[&id].last_seen;
    tokio::time::sleep(Duration::from_millis(5)).await;
    with_session(&state, id, |_| Ok(())).await.unwrap();
    assert!(state.sessions.read().await[&id].last_seen > before);
}

// =============================================================================
// eviction
// =============================================================================

#[tokio::test]
async fn evict_idle_drops_only_stale_sessions() {
    let state = test_helpers::test_app_state_with(|c| c.session_ttl = Duration::from_secs(60));
    let stale = test_helpers::seed_session(&state).await;
    let fresh = test_helpers::seed_session(&state).await;

    let now = Instant::now();
    state.sessions.write().await.get_mut(&stale).unwrap().last_seen = now - Duration::from_secs(61);

    assert_eq!(evict_idle(&state, now).await, 1);
    let sessions = state.sessions.read().await;
    assert!(!sessions.contains_key(&stale));
    assert!(sessions.contains_key(&fresh));
}
