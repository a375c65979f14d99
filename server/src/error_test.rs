use super::*;

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be json")
}

#[test]
fn codes_and_statuses_line_up() {
    let cases = [
        (ApiError::BadRequest("x".into()), "E_BAD_REQUEST", StatusCode::BAD_REQUEST),
        (ApiError::PayloadTooLarge { actual: 2, limit: 1 }, "E_PAYLOAD_TOO_LARGE", StatusCode::PAYLOAD_TOO_LARGE),
        (ApiError::SessionNotFound(Uuid::nil()), "E_SESSION_NOT_FOUND", StatusCode::NOT_FOUND),
        (ApiError::TooManySessions(4), "E_TOO_MANY_SESSIONS", StatusCode::SERVICE_UNAVAILABLE),
        (ApiError::Store(StoreError::NotLoaded), "E_NOT_LOADED", StatusCode::CONFLICT),
        (ApiError::Store(StoreError::UnknownElement("a".into())), "E_ELEMENT_NOT_FOUND", StatusCode::NOT_FOUND),
        (ApiError::Store(StoreError::InvalidOrder), "E_INVALID_ORDER", StatusCode::BAD_REQUEST),
        (
            ApiError::Store(StoreError::UnknownOptionGroup("g".into())),
            "E_OPTION_GROUP_NOT_FOUND",
            StatusCode::NOT_FOUND,
        ),
    ];
    for (err, code, status) in cases {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.status(), status, "{code}");
    }
}

#[test]
fn svg_errors_are_unprocessable() {
    let err: ApiError = SvgError::NotSvg("html".into()).into();
    assert_eq!(err.error_code(), "E_INVALID_SVG");
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let nested = ApiError::Store(StoreError::Svg(SvgError::NotSvg("html".into())));
    assert_eq!(nested.error_code(), "E_INVALID_SVG");
}

#[tokio::test]
async fn response_body_carries_code_and_message() {
    let response = ApiError::SessionNotFound(Uuid::nil()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E_SESSION_NOT_FOUND");
    assert!(body["message"].as_str().unwrap_or_default().contains("not found"));
}

#[test]
fn size_check_allows_exact_limit() {
    assert!(check_svg_size("abcd", 4).is_ok());
    assert!(matches!(check_svg_size("abcde", 4), Err(ApiError::PayloadTooLarge { actual: 5, limit: 4 })));
}
