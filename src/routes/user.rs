// SPDX-License-Identifier: MIT

//! Authenticated user-state routes: profile, watch history, library, and
//! channel subscriptions.
//!
//! Mutations are read-modify-write: fetch the user document, apply the
//! change through the model helpers (which own the dedup/cap invariants),
//! and write the affected field back. The auth middleware is applied in
//! routes/mod.rs for these routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Channel, HistoryEntry, LibraryEntry, UserDoc, Video};
use crate::routes::auth::ProfileResponse;
use crate::services::{DataSource, YouTubeService};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Uploads fetched per subscribed channel for the feed.
const FEED_UPLOADS_PER_CHANNEL: u32 = 5;
const TRENDING_FALLBACK_RESULTS: u32 = 20;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/history", get(get_history).delete(clear_history))
        .route("/api/history/{watched_at}", delete(remove_history_entry))
        .route("/api/library", get(get_library).post(save_to_library))
        .route("/api/library/toggle", post(toggle_library))
        .route("/api/library/{video_id}", delete(remove_from_library))
        .route("/api/subscriptions", get(get_subscriptions))
        .route(
            "/api/subscriptions/{channel_id}",
            post(toggle_subscription).delete(unsubscribe),
        )
        .route("/api/subscriptions/feed", get(get_subscriptions_feed))
}

/// Fetch the user's document, or a fresh empty one if nothing was written
/// yet (documents are created lazily on first write).
async fn load_doc(state: &Arc<AppState>, uid: &str) -> Result<(UserDoc, bool)> {
    match state.db.get_user(uid).await? {
        Some(doc) => Ok((doc, true)),
        None => Ok((
            UserDoc::new(uid.to_string(), None, "YouTube User".to_string(), None),
            false,
        )),
    }
}

// ─── Profile ─────────────────────────────────────────────────

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let doc = state
        .db
        .get_user(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.uid)))?;
    Ok(Json(ProfileResponse::from(&doc)))
}

// ─── History ─────────────────────────────────────────────────

#[derive(Serialize)]
struct HistoryResponse {
    items: Vec<HistoryEntry>,
}

/// Watch history, most-recent-first as stored.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HistoryResponse>> {
    let (doc, _) = load_doc(&state, &user.uid).await?;
    Ok(Json(HistoryResponse { items: doc.history }))
}

#[derive(Serialize)]
struct MutationResponse {
    success: bool,
}

/// Remove a single history entry, keyed by its watched-at timestamp.
async fn remove_history_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(watched_at): Path<String>,
) -> Result<Json<MutationResponse>> {
    let (mut doc, existed) = load_doc(&state, &user.uid).await?;
    if !doc.remove_history(&watched_at) {
        return Err(AppError::NotFound("History entry not found".to_string()));
    }
    persist_history(&state, &doc, existed).await?;
    Ok(Json(MutationResponse { success: true }))
}

/// Clear the entire watch history.
async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MutationResponse>> {
    let (mut doc, existed) = load_doc(&state, &user.uid).await?;
    doc.clear_history();
    persist_history(&state, &doc, existed).await?;
    Ok(Json(MutationResponse { success: true }))
}

async fn persist_history(state: &Arc<AppState>, doc: &UserDoc, existed: bool) -> Result<()> {
    if existed {
        state.db.set_history(doc).await
    } else {
        state.db.upsert_user(doc).await
    }
}

// ─── Library ─────────────────────────────────────────────────

#[derive(Serialize)]
struct LibraryResponse {
    items: Vec<LibraryEntry>,
}

async fn get_library(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LibraryResponse>> {
    let (doc, _) = load_doc(&state, &user.uid).await?;
    Ok(Json(LibraryResponse { items: doc.library }))
}

#[derive(Deserialize)]
struct SaveVideoRequest {
    video_id: String,
    title: String,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl SaveVideoRequest {
    fn into_entry(self) -> Result<LibraryEntry> {
        if self.video_id.trim().is_empty() {
            return Err(AppError::BadRequest(
                "'video_id' must not be empty".to_string(),
            ));
        }
        Ok(LibraryEntry {
            video_id: self.video_id,
            title: self.title,
            thumbnail: self.thumbnail,
        })
    }
}

#[derive(Serialize)]
struct LibraryStatusResponse {
    in_library: bool,
}

/// Save a video. Idempotent: re-saving an already-saved id is a no-op.
async fn save_to_library(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SaveVideoRequest>,
) -> Result<Json<LibraryStatusResponse>> {
    let entry = body.into_entry()?;
    let (mut doc, existed) = load_doc(&state, &user.uid).await?;
    if doc.save_to_library(entry) {
        persist_library(&state, &doc, existed).await?;
    }
    Ok(Json(LibraryStatusResponse { in_library: true }))
}

/// Toggle a video's library membership.
async fn toggle_library(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SaveVideoRequest>,
) -> Result<Json<LibraryStatusResponse>> {
    let entry = body.into_entry()?;
    let (mut doc, existed) = load_doc(&state, &user.uid).await?;
    let in_library = doc.toggle_library(entry);
    persist_library(&state, &doc, existed).await?;
    Ok(Json(LibraryStatusResponse { in_library }))
}

async fn remove_from_library(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> Result<Json<LibraryStatusResponse>> {
    let (mut doc, existed) = load_doc(&state, &user.uid).await?;
    if doc.remove_from_library(&video_id) {
        persist_library(&state, &doc, existed).await?;
    }
    Ok(Json(LibraryStatusResponse { in_library: false }))
}

async fn persist_library(state: &Arc<AppState>, doc: &UserDoc, existed: bool) -> Result<()> {
    if existed {
        state.db.set_library(doc).await
    } else {
        state.db.upsert_user(doc).await
    }
}

// ─── Subscriptions ───────────────────────────────────────────

#[derive(Serialize)]
struct SubscriptionsResponse {
    channel_ids: Vec<String>,
    channels: Vec<Channel>,
    source: DataSource,
}

/// The user's subscribed channels, resolved to channel resources.
async fn get_subscriptions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SubscriptionsResponse>> {
    let (doc, _) = load_doc(&state, &user.uid).await?;
    let resolved = state.youtube.channels(&doc.subscriptions).await?;
    Ok(Json(SubscriptionsResponse {
        channel_ids: doc.subscriptions,
        channels: resolved.items,
        source: resolved.source,
    }))
}

#[derive(Serialize)]
struct SubscriptionStatusResponse {
    subscribed: bool,
}

/// Toggle a channel subscription (strict set semantics).
async fn toggle_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> Result<Json<SubscriptionStatusResponse>> {
    if channel_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Channel id must not be empty".to_string(),
        ));
    }
    let (mut doc, existed) = load_doc(&state, &user.uid).await?;
    let subscribed = doc.toggle_subscription(&channel_id);
    persist_subscriptions(&state, &doc, existed).await?;
    Ok(Json(SubscriptionStatusResponse { subscribed }))
}

async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> Result<Json<SubscriptionStatusResponse>> {
    let (mut doc, existed) = load_doc(&state, &user.uid).await?;
    if doc.unsubscribe(&channel_id) {
        persist_subscriptions(&state, &doc, existed).await?;
    }
    Ok(Json(SubscriptionStatusResponse { subscribed: false }))
}

async fn persist_subscriptions(state: &Arc<AppState>, doc: &UserDoc, existed: bool) -> Result<()> {
    if existed {
        state.db.set_subscriptions(doc).await
    } else {
        state.db.upsert_user(doc).await
    }
}

// ─── Subscriptions feed ──────────────────────────────────────

#[derive(Serialize)]
struct SubscriptionsFeedResponse {
    channels: Vec<Channel>,
    videos: Vec<Video>,
    source: DataSource,
    /// True when the upstream quota was exhausted and trending videos were
    /// substituted for the user's subscription uploads
    quota_fallback: bool,
}

/// Latest uploads across the user's subscribed channels, newest first,
/// plus the channel list for the manage bar.
async fn get_subscriptions_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SubscriptionsFeedResponse>> {
    let (doc, _) = load_doc(&state, &user.uid).await?;

    if doc.subscriptions.is_empty() {
        return Ok(Json(SubscriptionsFeedResponse {
            channels: Vec::new(),
            videos: Vec::new(),
            source: DataSource::Live,
            quota_fallback: false,
        }));
    }

    let channels = match state.youtube.channels(&doc.subscriptions).await {
        Ok(resolved) => resolved,
        Err(err) if YouTubeService::is_quota_error(&err) => {
            return trending_fallback(&state).await;
        }
        Err(err) => return Err(err),
    };

    let uploads = join_all(doc.subscriptions.iter().map(|channel_id| {
        state
            .youtube
            .activities(channel_id, FEED_UPLOADS_PER_CHANNEL)
    }))
    .await;

    let mut source = channels.source;
    let mut videos: Vec<Video> = Vec::new();
    for result in uploads {
        match result {
            Ok(resp) => {
                if resp.source == DataSource::Fixture {
                    source = DataSource::Fixture;
                }
                videos.extend(
                    resp.items
                        .into_iter()
                        .filter(|a| a.is_upload())
                        .map(|a| a.into_video()),
                );
            }
            Err(err) if YouTubeService::is_quota_error(&err) => {
                return trending_fallback(&state).await;
            }
            // One channel's feed failing should not blank the whole page
            Err(err) => {
                tracing::warn!(error = %err, "Channel activity lookup failed");
            }
        }
    }

    videos.sort_by(|a, b| b.snippet.published_at.cmp(&a.snippet.published_at));

    Ok(Json(SubscriptionsFeedResponse {
        channels: channels.items,
        videos,
        source,
        quota_fallback: false,
    }))
}

/// Quota exhausted mid-feed: degrade to trending videos and say so.
async fn trending_fallback(state: &Arc<AppState>) -> Result<Json<SubscriptionsFeedResponse>> {
    tracing::warn!("Quota exhausted building subscriptions feed; serving trending instead");
    let trending = state
        .youtube
        .trending(TRENDING_FALLBACK_RESULTS, "US")
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Trending fallback failed");
            crate::services::Sourced {
                items: Vec::new(),
                source: DataSource::Live,
            }
        });
    Ok(Json(SubscriptionsFeedResponse {
        channels: Vec::new(),
        videos: trending.items,
        source: trending.source,
        quota_fallback: true,
    }))
}
