// SPDX-License-Identifier: MIT

//! Bundled fixture data set standing in for live YouTube API responses.
//!
//! Loaded once at startup from a JSON file shaped like the upstream API.
//! The catalog also owns the playable-id map (fixture id → real embeddable
//! video id), so the embed URL logic has a single source of truth.

use crate::models::{Activity, ActivityContentDetails, ActivityUpload, Channel, Video};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// In-memory fixture catalog.
#[derive(Default, Clone)]
pub struct FixtureCatalog {
    videos: Vec<Video>,
    channels: Vec<Channel>,
    playable: HashMap<String, String>,
    default_playable: Option<String>,
}

#[derive(Deserialize)]
struct FixtureFile {
    #[serde(default)]
    videos: Vec<Video>,
    #[serde(default)]
    channels: Vec<Channel>,
    /// Fixture video id → real embeddable YouTube id
    #[serde(default)]
    playable: HashMap<String, String>,
    /// Embeddable id used for fixture ids missing from `playable`
    #[serde(default)]
    default_playable: Option<String>,
}

impl FixtureCatalog {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| FixtureError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, FixtureError> {
        let file: FixtureFile =
            serde_json::from_str(json_data).map_err(|e| FixtureError::ParseError(e.to_string()))?;

        tracing::info!(
            videos = file.videos.len(),
            channels = file.channels.len(),
            "Loaded fixture catalog"
        );

        Ok(Self {
            videos: file.videos,
            channels: file.channels,
            playable: file.playable,
            default_playable: file.default_playable,
        })
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    // ─── Response shaping ────────────────────────────────────────

    /// Search by case-insensitive substring over title and channel title.
    /// An empty query returns the whole set.
    pub fn search(&self, query: &str) -> Vec<Video> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return self.videos.clone();
        }
        self.videos
            .iter()
            .filter(|v| {
                v.snippet.title.to_lowercase().contains(&query)
                    || v.snippet.channel_title.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    /// Videos related to the given one: everything except it.
    pub fn related_to(&self, video_id: &str) -> Vec<Video> {
        self.videos
            .iter()
            .filter(|v| v.video_id() != video_id)
            .cloned()
            .collect()
    }

    /// Exact-id lookup.
    pub fn video_by_id(&self, video_id: &str) -> Option<Video> {
        self.videos
            .iter()
            .find(|v| v.video_id() == video_id)
            .cloned()
    }

    /// The "mostPopular" chart: the full set, truncated.
    pub fn trending(&self, max_results: usize) -> Vec<Video> {
        self.videos.iter().take(max_results).cloned().collect()
    }

    /// Channels whose id is in the given set. No extras; absent ids are
    /// simply omitted.
    pub fn channels(&self, ids: &[&str]) -> Vec<Channel> {
        self.channels
            .iter()
            .filter(|c| ids.contains(&c.id.as_str()))
            .cloned()
            .collect()
    }

    /// Synthesized upload activities for a channel, derived from its videos.
    pub fn activities(&self, channel_id: &str, max_results: usize) -> Vec<Activity> {
        self.videos
            .iter()
            .filter(|v| v.snippet.channel_id == channel_id)
            .take(max_results)
            .map(|v| {
                let mut snippet = v.snippet.clone();
                snippet.activity_type = Some("upload".to_string());
                Activity {
                    snippet,
                    content_details: ActivityContentDetails {
                        upload: ActivityUpload {
                            video_id: v.video_id().to_string(),
                        },
                    },
                }
            })
            .collect()
    }

    /// Resolve an id to one the embed player can actually play.
    ///
    /// Live ids pass through unchanged; fixture ids (the `m`-prefixed set)
    /// map through the table, falling back to the catalog default.
    pub fn playable_id<'a>(&'a self, video_id: &'a str) -> &'a str {
        if let Some(mapped) = self.playable.get(video_id) {
            return mapped;
        }
        if video_id.starts_with('m') {
            if let Some(default) = &self.default_playable {
                return default;
            }
        }
        video_id
    }
}

/// Errors from fixture loading.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse fixture JSON: {0}")]
    ParseError(String),
}
