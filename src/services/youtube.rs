// SPDX-License-Identifier: MIT

//! YouTube Data API adapter with fixture fallback.
//!
//! Every request is described by a typed [`ApiRequest`] (one addressing
//! convention for all call sites) and returns items tagged with their
//! [`DataSource`], so callers can surface fixture degradation instead of
//! guessing. Fallback applies on a missing API key or an upstream 403
//! (quota exhausted / key rejected); other failures propagate.

use crate::error::AppError;
use crate::models::{Activity, Channel, ListResponse, Video};
use crate::services::fixtures::FixtureCatalog;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_MAX_RESULTS: u32 = 50;

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fixture,
}

/// Items plus their provenance.
#[derive(Debug, Clone, Serialize)]
pub struct Sourced<T> {
    pub items: Vec<T>,
    pub source: DataSource,
}

/// Typed description of an upstream request.
#[derive(Debug, Clone)]
pub enum ApiRequest {
    Search {
        query: Option<String>,
        related_to: Option<String>,
        max_results: u32,
    },
    Videos {
        ids: Vec<String>,
    },
    Trending {
        max_results: u32,
        region_code: String,
    },
    Channels {
        ids: Vec<String>,
    },
    Activities {
        channel_id: String,
        max_results: u32,
    },
}

impl ApiRequest {
    /// Upstream resource path.
    pub fn path(&self) -> &'static str {
        match self {
            ApiRequest::Search { .. } => "search",
            ApiRequest::Videos { .. } | ApiRequest::Trending { .. } => "videos",
            ApiRequest::Channels { .. } => "channels",
            ApiRequest::Activities { .. } => "activities",
        }
    }

    /// Query parameters, excluding the API key.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            ApiRequest::Search {
                query,
                related_to,
                max_results,
            } => {
                let mut params = vec![
                    ("part", "snippet".to_string()),
                    ("type", "video".to_string()),
                    ("maxResults", max_results.to_string()),
                ];
                if let Some(q) = query {
                    params.push(("q", q.clone()));
                }
                if let Some(id) = related_to {
                    params.push(("relatedToVideoId", id.clone()));
                }
                params
            }
            ApiRequest::Videos { ids } => vec![
                ("part", "snippet".to_string()),
                ("id", ids.join(",")),
            ],
            ApiRequest::Trending {
                max_results,
                region_code,
            } => vec![
                ("part", "snippet,statistics".to_string()),
                ("chart", "mostPopular".to_string()),
                ("maxResults", max_results.to_string()),
                ("regionCode", region_code.clone()),
            ],
            ApiRequest::Channels { ids } => vec![
                ("part", "snippet".to_string()),
                ("id", ids.join(",")),
            ],
            ApiRequest::Activities {
                channel_id,
                max_results,
            } => vec![
                ("part", "snippet,contentDetails".to_string()),
                ("channelId", channel_id.clone()),
                ("maxResults", max_results.to_string()),
            ],
        }
    }
}

/// YouTube Data API client with fixture fallback.
#[derive(Clone)]
pub struct YouTubeService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    fixture_fallback: bool,
    fixtures: Arc<FixtureCatalog>,
    /// Channel id → icon URL, memoized to collapse per-card lookups
    icon_cache: Arc<DashMap<String, Option<String>>>,
}

impl YouTubeService {
    pub fn new(
        api_key: Option<String>,
        fixture_fallback: bool,
        fixtures: Arc<FixtureCatalog>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key,
            fixture_fallback,
            fixtures,
            icon_cache: Arc::new(DashMap::new()),
        }
    }

    /// Point the client at a different base URL (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn fixtures(&self) -> &FixtureCatalog {
        &self.fixtures
    }

    /// Whether an error is the upstream quota/auth failure.
    pub fn is_quota_error(err: &AppError) -> bool {
        matches!(err, AppError::YouTubeApi(msg) if msg == AppError::QUOTA_MARKER)
    }

    // ─── Typed operations ────────────────────────────────────────

    pub async fn search(&self, query: &str, max_results: u32) -> Result<Sourced<Video>, AppError> {
        let query = query.to_string();
        let req = ApiRequest::Search {
            query: Some(query.clone()),
            related_to: None,
            max_results,
        };
        self.get_with_fallback(&req, |f| f.search(&query)).await
    }

    pub async fn related(&self, video_id: &str) -> Result<Sourced<Video>, AppError> {
        let req = ApiRequest::Search {
            query: None,
            related_to: Some(video_id.to_string()),
            max_results: DEFAULT_MAX_RESULTS,
        };
        self.get_with_fallback(&req, |f| f.related_to(video_id))
            .await
    }

    /// Look up a single video by id, keeping the provenance tag.
    pub async fn video(&self, video_id: &str) -> Result<(Option<Video>, DataSource), AppError> {
        let req = ApiRequest::Videos {
            ids: vec![video_id.to_string()],
        };
        let resp: Sourced<Video> = self
            .get_with_fallback(&req, |f| f.video_by_id(video_id).into_iter().collect())
            .await?;
        let video = resp
            .items
            .into_iter()
            .find(|v| v.video_id() == video_id);
        Ok((video, resp.source))
    }

    pub async fn trending(
        &self,
        max_results: u32,
        region_code: &str,
    ) -> Result<Sourced<Video>, AppError> {
        let req = ApiRequest::Trending {
            max_results,
            region_code: region_code.to_string(),
        };
        self.get_with_fallback(&req, |f| f.trending(max_results as usize))
            .await
    }

    /// Batched channel lookup for a set of ids.
    pub async fn channels(&self, ids: &[String]) -> Result<Sourced<Channel>, AppError> {
        if ids.is_empty() {
            return Ok(Sourced {
                items: Vec::new(),
                source: DataSource::Live,
            });
        }
        let req = ApiRequest::Channels { ids: ids.to_vec() };
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut resp: Sourced<Channel> = self
            .get_with_fallback(&req, |f| f.channels(&id_refs))
            .await?;
        // The live API may return extras when an id is malformed; keep the
        // contract strict either way.
        resp.items.retain(|c| id_refs.contains(&c.id.as_str()));
        Ok(resp)
    }

    pub async fn activities(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Sourced<Activity>, AppError> {
        let req = ApiRequest::Activities {
            channel_id: channel_id.to_string(),
            max_results,
        };
        self.get_with_fallback(&req, |f| f.activities(channel_id, max_results as usize))
            .await
    }

    /// Resolve a channel's icon URL, memoized per channel.
    pub async fn channel_icon(&self, channel_id: &str) -> Result<Option<String>, AppError> {
        if let Some(cached) = self.icon_cache.get(channel_id) {
            return Ok(cached.clone());
        }
        let resp = self.channels(&[channel_id.to_string()]).await?;
        let icon = resp
            .items
            .iter()
            .find(|c| c.id == channel_id)
            .and_then(|c| c.snippet.thumbnails.default.as_ref())
            .map(|t| t.url.clone());
        self.icon_cache.insert(channel_id.to_string(), icon.clone());
        Ok(icon)
    }

    // ─── Request execution ───────────────────────────────────────

    async fn get_with_fallback<T, F>(
        &self,
        req: &ApiRequest,
        shape_fixture: F,
    ) -> Result<Sourced<T>, AppError>
    where
        T: for<'de> Deserialize<'de>,
        F: FnOnce(&FixtureCatalog) -> Vec<T>,
    {
        let Some(api_key) = &self.api_key else {
            // No key configured: fixture-only operation.
            return Ok(Sourced {
                items: shape_fixture(&self.fixtures),
                source: DataSource::Fixture,
            });
        };

        match self.get_live(req, api_key).await {
            Ok(resp) => Ok(Sourced {
                items: resp.items,
                source: DataSource::Live,
            }),
            Err(err) if Self::is_quota_error(&err) && self.fixture_fallback => {
                tracing::warn!(
                    resource = req.path(),
                    "YouTube quota/auth failure, substituting fixture data"
                );
                Ok(Sourced {
                    items: shape_fixture(&self.fixtures),
                    source: DataSource::Fixture,
                })
            }
            Err(err) => Err(err),
        }
    }

    async fn get_live<T: for<'de> Deserialize<'de>>(
        &self,
        req: &ApiRequest,
        api_key: &str,
    ) -> Result<ListResponse<T>, AppError> {
        let url = format!("{}/{}", self.base_url, req.path());
        let mut params = req.params();
        params.push(("key", api_key.to_string()));

        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::YouTubeApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Quota exhausted or key rejected
            if status.as_u16() == 403 {
                tracing::warn!("YouTube API returned 403");
                return Err(AppError::YouTubeApi(AppError::QUOTA_MARKER.to_string()));
            }

            return Err(AppError::YouTubeApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::YouTubeApi(format!("JSON parse error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_service() -> YouTubeService {
        let catalog = FixtureCatalog::load_from_json(
            r#"{
                "videos": [
                    {
                        "id": {"videoId": "m1"},
                        "snippet": {
                            "title": "Lofi Beats",
                            "channelId": "c-lofi",
                            "channelTitle": "Lofi Radio"
                        }
                    }
                ],
                "channels": [
                    {
                        "id": "c-lofi",
                        "snippet": {
                            "title": "Lofi Radio",
                            "thumbnails": {"default": {"url": "https://img/c-lofi.jpg"}}
                        }
                    }
                ]
            }"#,
        )
        .unwrap();
        YouTubeService::new(None, true, Arc::new(catalog))
    }

    #[test]
    fn search_request_params() {
        let req = ApiRequest::Search {
            query: Some("rust".into()),
            related_to: None,
            max_results: 25,
        };
        assert_eq!(req.path(), "search");
        let params = req.params();
        assert!(params.contains(&("q", "rust".to_string())));
        assert!(params.contains(&("maxResults", "25".to_string())));
        assert!(params.contains(&("part", "snippet".to_string())));
    }

    #[test]
    fn trending_request_params() {
        let req = ApiRequest::Trending {
            max_results: 20,
            region_code: "US".into(),
        };
        assert_eq!(req.path(), "videos");
        assert!(req.params().contains(&("chart", "mostPopular".to_string())));
        assert!(req.params().contains(&("regionCode", "US".to_string())));
    }

    #[tokio::test]
    async fn missing_api_key_serves_fixture_data() {
        let svc = fixture_service();
        let resp = svc.search("lofi", 10).await.unwrap();
        assert_eq!(resp.source, DataSource::Fixture);
        assert_eq!(resp.items.len(), 1);
    }

    #[tokio::test]
    async fn no_match_yields_empty_items_not_error() {
        let svc = fixture_service();
        let resp = svc.search("no-such-video", 10).await.unwrap();
        assert_eq!(resp.source, DataSource::Fixture);
        assert!(resp.items.is_empty());
    }

    #[tokio::test]
    async fn channel_icon_is_memoized() {
        let svc = fixture_service();
        let icon = svc.channel_icon("c-lofi").await.unwrap();
        assert_eq!(icon.as_deref(), Some("https://img/c-lofi.jpg"));
        assert!(svc.icon_cache.contains_key("c-lofi"));
        // Second lookup hits the cache
        let again = svc.channel_icon("c-lofi").await.unwrap();
        assert_eq!(again, icon);
    }

    #[tokio::test]
    async fn channels_returns_only_requested_ids() {
        let svc = fixture_service();
        let resp = svc
            .channels(&["c-lofi".to_string(), "c-missing".to_string()])
            .await
            .unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].id, "c-lofi");
    }
}
