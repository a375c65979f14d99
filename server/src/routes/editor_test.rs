use stencil::svg::visibility;

use super::*;
use crate::state::test_helpers::{self, TEMPLATE};

const RECORD: RecordQuery = RecordQuery { record: true };

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

async fn seeded() -> (AppState, Uuid) {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state).await;
    (state, id)
}

fn set_text(value: &str) -> UpdateElementBody {
    UpdateElementBody { changes: vec![ElementChange { field: ElementField::Text, value: Some(value.into()) }], record: true }
}

// =============================================================================
// lifecycle
// =============================================================================

#[tokio::test]
async fn open_then_snapshot_then_close() {
    let state = test_helpers::test_app_state();
    let (status, Json(opened)) = open(State(state.clone()), Json(OpenBody { svg: TEMPLATE.into() }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(opened.elements, 5);

    let Json(snap) = snapshot(State(state.clone()), Path(opened.id)).await.unwrap();
    assert_eq!(snap.order.len(), 5);
    assert_eq!(snap.fields.len(), 3);
    assert_eq!(snap.history, HistoryState { index: None, len: 0, can_undo: false, can_redo: false });

    assert_eq!(close(State(state.clone()), Path(opened.id)).await.unwrap(), StatusCode::NO_CONTENT);
    assert!(matches!(snapshot(State(state), Path(opened.id)).await, Err(ApiError::SessionNotFound(_))));
}

#[tokio::test]
async fn open_rejects_malformed_svg() {
    let state = test_helpers::test_app_state();
    let result = open(State(state), Json(OpenBody { svg: "<svg".into() })).await;
    assert!(matches!(result, Err(ApiError::Store(_))));
}

// =============================================================================
// mutations and history
// =============================================================================

#[tokio::test]
async fn update_undo_redo_round_trip() {
    let (state, id) = seeded().await;
    let target = "Name.text.max_20".to_owned();

    let Json(updated) = update_element(State(state.clone()), Path((id, target.clone())), Json(set_text("Grace")))
        .await
        .unwrap();
    assert_eq!(updated.patches.len(), 1);
    assert_eq!(updated.element.inner_text.as_deref(), Some("Grace"));
    assert!(updated.history.can_undo);

    let Json(undone) = undo(State(state.clone()), Path(id)).await.unwrap();
    assert!(undone.applied);
    assert!(undone.history.can_redo);
    let doc = body_text(svg(State(state.clone()), Path(id)).await.unwrap()).await;
    assert!(doc.contains(">Ada</text>"), "{doc}");

    let Json(redone) = redo(State(state.clone()), Path(id)).await.unwrap();
    assert!(redone.applied);
    let doc = body_text(svg(State(state), Path(id)).await.unwrap()).await;
    assert!(doc.contains(">Grace</text>"), "{doc}");
}

#[tokio::test]
async fn unrecorded_update_skips_history() {
    let (state, id) = seeded().await;
    let mut body = set_text("typing");
    body.record = false;
    let Json(updated) = update_element(State(state), Path((id, "Name.text.max_20".into())), Json(body))
        .await
        .unwrap();
    assert!(!updated.history.can_undo);
}

#[tokio::test]
async fn attribute_change_uses_tagged_field() {
    let (state, id) = seeded().await;
    let body: UpdateElementBody = serde_json::from_value(serde_json::json!({
        "changes": [{ "field": { "kind": "attribute", "name": "fill" }, "value": "red" }]
    }))
    .unwrap();
    assert!(body.record);
    let Json(updated) = update_element(State(state), Path((id, "Badge".into())), Json(body)).await.unwrap();
    assert_eq!(updated.element.attributes["fill"], "red");
}

#[tokio::test]
async fn update_unknown_element_is_not_found() {
    let (state, id) = seeded().await;
    let result = update_element(State(state), Path((id, "ghost".into())), Json(set_text("x"))).await;
    let err = result.err().unwrap();
    assert_eq!(crate::error::ErrorCode::error_code(&err), "E_ELEMENT_NOT_FOUND");
}

#[tokio::test]
async fn delete_and_duplicate_change_the_document() {
    let (state, id) = seeded().await;

    let Json(removed) = delete_element(State(state.clone()), Path((id, "Badge".into())), Query(RECORD))
        .await
        .unwrap();
    assert_eq!(removed.tag, "rect");

    let (status, Json(copy)) =
        duplicate_element(State(state.clone()), Path((id, "Name.text.max_20".into())), Query(RECORD))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy.internal_id, "Name_2.text.max_20");

    let doc = body_text(svg(State(state.clone()), Path(id)).await.unwrap()).await;
    assert!(!doc.contains("<rect"));
    assert_eq!(doc.matches(">Ada</text>").count(), 2);

    undo(State(state.clone()), Path(id)).await.unwrap();
    undo(State(state.clone()), Path(id)).await.unwrap();
    let doc = body_text(svg(State(state), Path(id)).await.unwrap()).await;
    assert!(doc.contains("<rect"));
}

#[tokio::test]
async fn reorder_requires_a_permutation() {
    let (state, id) = seeded().await;
    let Json(snap) = snapshot(State(state.clone()), Path(id)).await.unwrap();
    let mut order = snap.order.clone();
    order.reverse();

    let Json(applied) = reorder(State(state.clone()), Path(id), Json(ReorderBody { order: order.clone(), record: true }))
        .await
        .unwrap();
    assert_eq!(applied, order);

    let result = reorder(State(state), Path(id), Json(ReorderBody { order: order[1..].to_vec(), record: true })).await;
    assert!(matches!(result, Err(ApiError::Store(_))));
}

#[tokio::test]
async fn option_selection_flips_group_visibility() {
    let (state, id) = seeded().await;
    let body = OptionBody { base_id: "Plan".into(), value: "pro".into(), record: true };
    let Json(response) = set_option(State(state.clone()), Path(id), Json(body)).await.unwrap();
    assert_eq!(response.changed, 2);

    let Json(snap) = snapshot(State(state.clone()), Path(id)).await.unwrap();
    let find = |internal_id: &str| snap.elements.iter().find(|e| e.internal_id == internal_id).unwrap();
    assert!(visibility::is_hidden(&find("Plan.select_basic").attributes));
    assert!(!visibility::is_hidden(&find("Plan.select_pro").attributes));

    let missing = OptionBody { base_id: "Size".into(), value: "m".into(), record: true };
    let err = set_option(State(state), Path(id), Json(missing)).await.err().unwrap();
    assert_eq!(crate::error::ErrorCode::error_code(&err), "E_OPTION_GROUP_NOT_FOUND");
}

// =============================================================================
// selection and preview
// =============================================================================

#[tokio::test]
async fn preview_highlights_selection_or_requested_element() {
    let (state, id) = seeded().await;

    let plain = body_text(preview(State(state.clone()), Path(id)).await.unwrap()).await;
    assert!(!plain.contains("outline"));
    assert!(plain.contains(r#"data-internal-id="Badge""#));

    let Json(selected) =
        select(State(state.clone()), Path(id), Json(SelectBody { internal_id: Some("Badge".into()) }))
            .await
            .unwrap();
    assert_eq!(selected.selected.as_deref(), Some("Badge"));
    let highlighted = body_text(preview(State(state.clone()), Path(id)).await.unwrap()).await;
    assert_eq!(highlighted.matches("outline: 2px solid").count(), 1);

    let response = preview_element(State(state.clone()), Path((id, "Name.text.max_20".into()))).await.unwrap();
    assert_eq!(response.headers()[CONTENT_TYPE], "image/svg+xml; charset=utf-8");
    let other = body_text(response).await;
    assert!(other.contains(r#"y="20" style="outline: 2px solid"#), "{other}");

    let Json(snap) = snapshot(State(state), Path(id)).await.unwrap();
    assert_eq!(snap.selected.as_deref(), Some("Badge"));
}

#[tokio::test]
async fn select_unknown_element_is_rejected() {
    let (state, id) = seeded().await;
    let result = select(State(state), Path(id), Json(SelectBody { internal_id: Some("ghost".into()) })).await;
    assert!(matches!(result, Err(ApiError::Store(_))));
}
