use super::*;

async fn parse_id(raw: &str) -> ParseIdResponse {
    parse(Json(ParseIdBody { id: raw.into() })).await.0
}

#[tokio::test]
async fn parse_splits_and_classifies() {
    let response = parse_id("Name.text.max_20.req").await;
    assert_eq!(response.parsed.base_id, "Name");
    assert_eq!(response.parsed.parts, ["text", "max_20", "req"]);
    assert_eq!(response.field_type, Some(FieldType::Text));
    assert!(response.validation.is_valid);
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn parse_reports_hard_errors() {
    let response = parse_id("Name.text.email").await;
    assert!(!response.validation.is_valid);
    assert!(response.validation.error.is_some());
}

#[tokio::test]
async fn parse_keeps_unknown_tokens_as_warnings() {
    let response = parse_id("Name.text.sparkle").await;
    assert!(response.validation.is_valid);
    assert_eq!(response.warnings, [IdIssue::UnknownToken { token: "sparkle".into() }]);
}

#[tokio::test]
async fn plain_ids_have_no_field_type() {
    let response = parse_id("Logo").await;
    assert_eq!(response.field_type, None);
    assert!(response.parsed.parts.is_empty());
}

#[tokio::test]
async fn suggest_completes_field_types_then_extensions() {
    let types = suggest(Json(SuggestBody { input: "Name.te".into() })).await.0;
    let keys: Vec<_> = types.iter().map(|def| def.key).collect();
    assert_eq!(keys, ["text", "textarea", "tel"]);

    let after_text = suggest(Json(SuggestBody { input: "Name.text.".into() })).await.0;
    assert!(after_text.iter().any(|def| def.key == "max"));
    assert!(after_text.iter().all(|def| def.key != "text"));
}

#[tokio::test]
async fn suggest_serializes_token_catalog_entries() {
    let tokens = suggest(Json(SuggestBody { input: "Zip.text.ma".into() })).await.0;
    let json = serde_json::to_value(&tokens).unwrap();
    assert_eq!(json[0]["key"], "max");
    assert_eq!(json[0]["kind"], "extension");
    assert_eq!(json[0]["requires_value"], true);
}
