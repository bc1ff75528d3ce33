// SPDX-License-Identifier: MIT

//! Tubefeed: backend API for a YouTube-style video browsing client.
//!
//! Serves normalized video data from the YouTube Data API (with a bundled
//! fixture fallback for quota-limited development) and keeps per-user watch
//! history, saved-video library, and channel subscriptions in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{GoogleIdVerifier, YouTubeService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub youtube: YouTubeService,
    pub google_verifier: Arc<GoogleIdVerifier>,
}
