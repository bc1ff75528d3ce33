// SPDX-License-Identifier: MIT

//! Quota-exhaustion fallback tests.
//!
//! A local stub upstream answers every request with 403, which is how the
//! YouTube Data API reports both an exhausted quota and a rejected key.
//! With an API key configured the adapter must degrade to fixture data
//! (when enabled) instead of failing the page.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;
use tubefeed::services::{DataSource, YouTubeService};

mod common;

/// Serve 403 with a quota-exceeded body on every path, as the live API does.
async fn spawn_quota_exhausted_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().unwrap();

    let app = axum::Router::new().fallback(|| async {
        (
            StatusCode::FORBIDDEN,
            axum::Json(serde_json::json!({
                "error": { "code": 403, "message": "quotaExceeded" }
            })),
        )
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn quota_limited_service(fallback: bool) -> YouTubeService {
    let base_url = spawn_quota_exhausted_upstream().await;
    YouTubeService::new(
        Some("configured-but-rejected-key".to_string()),
        fallback,
        common::test_fixtures(),
    )
    .with_base_url(base_url)
}

#[tokio::test]
async fn upstream_403_falls_back_to_fixture_data() {
    let svc = quota_limited_service(true).await;

    let resp = svc.search("rust", 10).await.unwrap();
    assert_eq!(resp.source, DataSource::Fixture);
    assert!(!resp.items.is_empty());
}

#[tokio::test]
async fn upstream_403_without_fallback_is_a_quota_error() {
    let svc = quota_limited_service(false).await;

    let err = svc.search("rust", 10).await.unwrap_err();
    assert!(YouTubeService::is_quota_error(&err));
}

#[tokio::test]
async fn trending_and_channels_also_fall_back_on_403() {
    let svc = quota_limited_service(true).await;

    let trending = svc.trending(20, "US").await.unwrap();
    assert_eq!(trending.source, DataSource::Fixture);

    let channels = svc.channels(&["ch-fireship".to_string()]).await.unwrap();
    assert_eq!(channels.source, DataSource::Fixture);
    assert_eq!(channels.items.len(), 1);
}

#[tokio::test]
async fn subscriptions_feed_reports_quota_fallback() {
    require_emulator!();

    let db = common::test_db().await;
    let uid = format!(
        "test-user-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );

    // A subscribed user whose upstream lookups all hit the quota wall
    let mut doc = tubefeed::models::UserDoc::new(uid.clone(), None, "Test User".into(), None);
    doc.toggle_subscription("ch-fireship");
    db.upsert_user(&doc).await.unwrap();

    let youtube = quota_limited_service(false).await;
    let verifier = tubefeed::services::GoogleIdVerifier::new(
        &tubefeed::config::Config::test_default(),
    )
    .unwrap();
    let (app, state) = common::create_test_app_custom(db, youtube, verifier);
    let token = common::create_test_jwt(&uid, &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/subscriptions/feed")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // Degraded but not broken: the flag is set and the page still renders
    assert_eq!(json["quota_fallback"], true);
    assert!(json["channels"].as_array().unwrap().is_empty());
    assert!(json["videos"].as_array().unwrap().is_empty());
}
