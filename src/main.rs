// SPDX-License-Identifier: MIT

//! Tubefeed API Server
//!
//! Serves video browsing data (YouTube Data API with fixture fallback) and
//! per-user watch history, library, and subscriptions stored in Firestore.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tubefeed::{
    config::Config,
    db::FirestoreDb,
    services::{FixtureCatalog, GoogleIdVerifier, YouTubeService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Tubefeed API");

    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Load the bundled fixture data set
    tracing::info!(path = %config.fixture_path, "Loading fixture catalog");
    let fixtures = Arc::new(
        FixtureCatalog::load_from_file(&config.fixture_path)
            .expect("Failed to load fixture catalog"),
    );
    tracing::info!(count = fixtures.videos().len(), "Fixture catalog loaded");

    if config.youtube_api_key.is_none() {
        tracing::warn!("No YOUTUBE_API_KEY configured; serving fixture data only");
    }

    // Initialize the YouTube adapter
    let youtube = YouTubeService::new(
        config.youtube_api_key.clone(),
        config.fixture_fallback,
        fixtures,
    );

    let google_verifier =
        Arc::new(GoogleIdVerifier::new(&config).expect("Failed to initialize sign-in verifier"));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        youtube,
        google_verifier,
    });

    // Build router
    let app = tubefeed::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Structured JSON logs, flattened for Cloud Logging ingestion.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tubefeed=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
