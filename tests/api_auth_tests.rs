// SPDX-License-Identifier: MIT

//! Authentication enforcement tests for the user-state API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn get(app: axum::Router, uri: &str) -> axum::http::Response<axum::body::Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = common::create_test_app();
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_user_routes_require_auth() {
    for uri in [
        "/api/me",
        "/api/history",
        "/api/library",
        "/api/subscriptions",
        "/api/subscriptions/feed",
    ] {
        let (app, _) = common::create_test_app();
        let response = get(app, uri).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{uri} should require auth"
        );
    }
}

#[tokio::test]
async fn test_garbage_bearer_token_is_rejected() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_wrong_key_is_rejected() {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt("user-1", b"some_other_signing_key_entirely!");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    // Offline db: the handler runs and fails on the database, not on auth.
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, format!("tube_session={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Past the auth layer; fails only because the mock db is offline
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
