// SPDX-License-Identifier: MIT

//! YouTube Data API resource shapes.
//!
//! Only the fields this service actually reads are modeled; unknown fields
//! are ignored on deserialization and omitted on re-serialization.
//!
//! See: <https://developers.google.com/youtube/v3/docs>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// List envelope returned by every `list` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// A video identifier, which the upstream API returns either as a bare
/// string (`videos.list`) or wrapped in an object (`search.list`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoId {
    Wrapped {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    Bare(String),
}

impl VideoId {
    pub fn as_str(&self) -> &str {
        match self {
            VideoId::Wrapped { video_id } => video_id,
            VideoId::Bare(id) => id,
        }
    }
}

/// A video resource (from `videos.list`, `search.list`, or a synthesized
/// subscriptions-feed entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub snippet: Snippet,
}

impl Video {
    pub fn video_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Basic details shared by video and activity resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "channelId", default)]
    pub channel_id: String,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// Activity type ("upload" for new-video events); absent on videos.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
}

/// Thumbnail URLs at the resolutions the client renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Best thumbnail for a video card (high, falling back down the ladder).
    pub fn best_url(&self) -> Option<&str> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// A channel resource (from `channels.list`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub snippet: ChannelSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// A channel activity (from `activities.list`); the subscriptions feed keeps
/// only entries whose snippet type is "upload".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub snippet: Snippet,
    #[serde(rename = "contentDetails")]
    pub content_details: ActivityContentDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityContentDetails {
    pub upload: ActivityUpload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityUpload {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

impl Activity {
    pub fn is_upload(&self) -> bool {
        self.snippet.activity_type.as_deref() == Some("upload")
    }

    /// Reshape an upload activity into the video form the client renders.
    pub fn into_video(self) -> Video {
        Video {
            id: VideoId::Wrapped {
                video_id: self.content_details.upload.video_id,
            },
            snippet: self.snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_parses_both_shapes() {
        let wrapped: VideoId = serde_json::from_str(r#"{"videoId": "abc123"}"#).unwrap();
        assert_eq!(wrapped.as_str(), "abc123");

        let bare: VideoId = serde_json::from_str(r#""abc123""#).unwrap();
        assert_eq!(bare.as_str(), "abc123");
    }

    #[test]
    fn list_response_tolerates_missing_items() {
        let resp: ListResponse<Video> = serde_json::from_str(r#"{}"#).unwrap();
        assert!(resp.items.is_empty());
    }

    #[test]
    fn activity_reshapes_to_video() {
        let activity: Activity = serde_json::from_value(serde_json::json!({
            "snippet": {
                "title": "New upload",
                "channelId": "c1",
                "channelTitle": "Channel One",
                "type": "upload"
            },
            "contentDetails": { "upload": { "videoId": "v1" } }
        }))
        .unwrap();

        assert!(activity.is_upload());
        let video = activity.into_video();
        assert_eq!(video.video_id(), "v1");
        assert_eq!(video.snippet.channel_id, "c1");
    }
}
