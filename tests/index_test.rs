//! Router-level tests for the index route, CORS and fallbacks.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::test_router;

const EXPECTED_BODY: &str = r#"{"message":"QR Feedback Flask API is running!"}"#;

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn index_returns_health_message() {
    let response = test_router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"message": "QR Feedback Flask API is running!"})
    );
}

#[tokio::test]
async fn index_ignores_method_query_and_body() {
    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri("/?business=bella-vista-123&rating=5")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"rating": 5, "comments": "great"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "method {method}");
        assert_eq!(body_string(response).await, EXPECTED_BODY, "method {method}");
    }
}

#[tokio::test]
async fn other_paths_are_not_found() {
    for path in ["/health", "/feedback", "/businesses/abc", "/api/v1"] {
        let response = test_router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
    }
}

#[tokio::test]
async fn cross_origin_request_gets_cors_headers() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://feedback.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn preflight_is_allowed() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
}
