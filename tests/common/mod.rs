// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tubefeed::config::Config;
use tubefeed::db::FirestoreDb;
use tubefeed::routes::create_router;
use tubefeed::services::{FixtureCatalog, GoogleIdVerifier, YouTubeService};
use tubefeed::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Load the bundled fixture catalog.
#[allow(dead_code)]
pub fn test_fixtures() -> Arc<FixtureCatalog> {
    Arc::new(
        FixtureCatalog::load_from_file("data/fixtures.json")
            .expect("Failed to load fixture catalog"),
    )
}

/// Create a session JWT for tests.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    tubefeed::middleware::auth::create_jwt(uid, signing_key).expect("Failed to create JWT")
}

/// Create a test app with an offline mock database and no API key, so all
/// browsing routes serve fixture data. Returns the router and shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app around a specific database (emulator-backed tests).
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let youtube = YouTubeService::new(None, config.fixture_fallback, test_fixtures());
    let google_verifier = GoogleIdVerifier::new(&config).expect("Failed to build verifier");
    create_test_app_custom(db, youtube, google_verifier)
}

/// Create a test app from explicit parts, for tests that need a stubbed
/// upstream or a static-key sign-in verifier.
#[allow(dead_code)]
pub fn create_test_app_custom(
    db: FirestoreDb,
    youtube: YouTubeService,
    google_verifier: GoogleIdVerifier,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db,
        youtube,
        google_verifier: Arc::new(google_verifier),
    });

    (create_router(state.clone()), state)
}
