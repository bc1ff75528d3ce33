// SPDX-License-Identifier: MIT

//! Public video-browsing routes: feed, search, trending, channels, detail.

use crate::error::{AppError, Result};
use crate::middleware::auth::try_authenticate;
use crate::models::{Channel, HistoryEntry, UserDoc, Video};
use crate::services::{DataSource, Sourced};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_QUERY_LEN: usize = 100;
const MAX_CHANNEL_IDS: usize = 50;
const DEFAULT_FEED_QUERY: &str = "new";
const FEED_MAX_RESULTS: u32 = 50;
const TRENDING_MAX_RESULTS: u32 = 20;
const EMBED_BASE_URL: &str = "https://www.youtube-nocookie.com/embed";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feed", get(get_feed))
        .route("/api/search", get(get_search))
        .route("/api/videos/trending", get(get_trending))
        .route("/api/videos/{id}", get(get_video_detail))
        .route("/api/channels", get(get_channels))
}

// ─── Feed & Search ───────────────────────────────────────────

#[derive(Deserialize)]
struct FeedQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

fn validate_query(q: &str) -> Result<()> {
    if q.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Query parameter 'q' must not be empty".to_string(),
        ));
    }
    if q.len() > MAX_QUERY_LEN {
        return Err(AppError::BadRequest(format!(
            "Query parameter 'q' must be at most {} characters",
            MAX_QUERY_LEN
        )));
    }
    Ok(())
}

/// Home feed: a search for the configured default topic, or the caller's.
async fn get_feed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedQuery>,
) -> Result<Json<Sourced<Video>>> {
    let query = params
        .q
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .unwrap_or(DEFAULT_FEED_QUERY);
    if query.len() > MAX_QUERY_LEN {
        return Err(AppError::BadRequest(format!(
            "Query parameter 'q' must be at most {} characters",
            MAX_QUERY_LEN
        )));
    }
    let resp = state.youtube.search(query, FEED_MAX_RESULTS).await?;
    Ok(Json(resp))
}

/// Search results.
async fn get_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Sourced<Video>>> {
    validate_query(&params.q)?;
    let resp = state.youtube.search(&params.q, FEED_MAX_RESULTS).await?;
    Ok(Json(resp))
}

// ─── Trending ────────────────────────────────────────────────

#[derive(Deserialize)]
struct TrendingQuery {
    #[serde(default = "default_region")]
    region: String,
}

fn default_region() -> String {
    "US".to_string()
}

async fn get_trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingQuery>,
) -> Result<Json<Sourced<Video>>> {
    if params.region.len() != 2 || !params.region.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::BadRequest(
            "Invalid 'region' parameter: must be a two-letter code".to_string(),
        ));
    }
    let resp = state
        .youtube
        .trending(TRENDING_MAX_RESULTS, &params.region)
        .await?;
    Ok(Json(resp))
}

// ─── Channels ────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChannelsQuery {
    /// Comma-joined channel ids
    id: String,
}

/// Batched channel lookup (one request for a whole grid of cards).
async fn get_channels(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChannelsQuery>,
) -> Result<Json<Sourced<Channel>>> {
    let ids: Vec<String> = params
        .id
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "Query parameter 'id' must contain at least one channel id".to_string(),
        ));
    }
    if ids.len() > MAX_CHANNEL_IDS {
        return Err(AppError::BadRequest(format!(
            "At most {} channel ids per request",
            MAX_CHANNEL_IDS
        )));
    }

    let resp = state.youtube.channels(&ids).await?;
    Ok(Json(resp))
}

// ─── Video detail ────────────────────────────────────────────

#[derive(Deserialize)]
struct DetailQuery {
    /// Page origin to pass through to the embed player
    origin: Option<String>,
}

#[derive(Serialize)]
pub struct VideoDetailResponse {
    pub video: Video,
    pub channel_icon: Option<String>,
    pub related: Vec<Video>,
    pub embed_url: String,
    pub source: DataSource,
    /// Present only for signed-in callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_library: Option<bool>,
}

/// Full video detail: the video, its channel icon, related videos, and the
/// privacy-enhanced embed URL. Signed-in callers also get their
/// subscription/library status, and the view is recorded in their history.
async fn get_video_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DetailQuery>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<VideoDetailResponse>> {
    let (video, source) = state.youtube.video(&id).await?;
    let video = video.ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

    let channel_id = video.snippet.channel_id.clone();

    let (channel_icon, related) = tokio::join!(
        state.youtube.channel_icon(&channel_id),
        state.youtube.related(&id),
    );

    // Best-effort secondary lookups; the detail page renders without them
    let channel_icon = channel_icon.unwrap_or_else(|e| {
        tracing::warn!(error = %e, channel = %channel_id, "Channel icon lookup failed");
        None
    });
    let related = match related {
        Ok(resp) => resp
            .items
            .into_iter()
            .filter(|v| v.video_id() != id)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Related videos lookup failed");
            Vec::new()
        }
    };

    let embed_url = build_embed_url(
        state.youtube.fixtures().playable_id(&id),
        params.origin.as_deref(),
    );

    let mut subscribed = None;
    let mut in_library = None;

    if let Some(user) = try_authenticate(&jar, &headers, &state.config.jwt_signing_key) {
        match record_watch(&state, &user.uid, &video).await {
            Ok(doc) => {
                subscribed = Some(doc.is_subscribed(&channel_id));
                in_library = Some(doc.in_library(&id));
            }
            Err(e) => {
                // The page still renders; history is best-effort
                tracing::error!(error = %e, uid = %user.uid, "Failed to record watch history");
            }
        }
    }

    Ok(Json(VideoDetailResponse {
        video,
        channel_icon,
        related,
        embed_url,
        source,
        subscribed,
        in_library,
    }))
}

/// Append a watch-history entry (dedup + cap applied by the model) and
/// return the user's document for status checks.
async fn record_watch(state: &Arc<AppState>, uid: &str, video: &Video) -> Result<UserDoc> {
    let existing = state.db.get_user(uid).await?;
    let existed = existing.is_some();

    // Lazily create the document on first write
    let mut doc = existing
        .unwrap_or_else(|| UserDoc::new(uid.to_string(), None, "YouTube User".to_string(), None));

    doc.record_watch(HistoryEntry {
        video_id: video.video_id().to_string(),
        title: video.snippet.title.clone(),
        thumbnail: video.snippet.thumbnails.best_url().map(String::from),
        watched_at: format_utc_rfc3339(chrono::Utc::now()),
    });

    if existed {
        state.db.set_history(&doc).await?;
    } else {
        state.db.upsert_user(&doc).await?;
    }

    Ok(doc)
}

/// Privacy-enhanced embed URL for a playable video id.
fn build_embed_url(playable_id: &str, origin: Option<&str>) -> String {
    match origin {
        Some(origin) if !origin.is_empty() => format!(
            "{}/{}?autoplay=1&origin={}",
            EMBED_BASE_URL,
            playable_id,
            urlencoding::encode(origin)
        ),
        _ => format!("{}/{}?autoplay=1", EMBED_BASE_URL, playable_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_url_includes_encoded_origin() {
        let url = build_embed_url("jfKfPfyJRdk", Some("http://localhost:5173"));
        assert_eq!(
            url,
            "https://www.youtube-nocookie.com/embed/jfKfPfyJRdk?autoplay=1&origin=http%3A%2F%2Flocalhost%3A5173"
        );
    }

    #[test]
    fn embed_url_without_origin() {
        let url = build_embed_url("abc", None);
        assert_eq!(url, "https://www.youtube-nocookie.com/embed/abc?autoplay=1");
    }

    #[test]
    fn query_validation_limits() {
        assert!(validate_query("rust").is_ok());
        assert!(validate_query("  ").is_err());
        assert!(validate_query(&"a".repeat(101)).is_err());
    }
}
