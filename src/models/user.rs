// SPDX-License-Identifier: MIT

//! Per-user document stored in Firestore.
//!
//! One document per signed-in user, keyed by the identity provider's user
//! ID. The three lists are independent; routes read-modify-write them
//! through the helpers here so the invariants live in one place.

use serde::{Deserialize, Serialize};

/// Watch history keeps at most this many entries, most-recent-first.
pub const HISTORY_CAP: usize = 50;

/// User profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    /// Identity provider user ID (also the document ID)
    pub uid: String,
    pub email: Option<String>,
    pub name: String,
    pub photo_url: Option<String>,
    /// When the user first signed in (RFC 3339)
    pub created_at: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub library: Vec<LibraryEntry>,
    #[serde(default)]
    pub subscriptions: Vec<String>,
}

/// A watched-video record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    /// RFC 3339 timestamp; unique per insertion, used as the removal key
    pub watched_at: String,
}

/// A saved-video record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
}

impl UserDoc {
    /// Fresh document for a first sign-in.
    pub fn new(uid: String, email: Option<String>, name: String, photo_url: Option<String>) -> Self {
        Self {
            uid,
            email,
            name,
            photo_url,
            created_at: crate::time_utils::format_utc_rfc3339(chrono::Utc::now()),
            history: Vec::new(),
            library: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    // ─── History ─────────────────────────────────────────────────

    /// Record a watch: any prior entry for the same video is dropped, the
    /// new entry goes to the front, and the list is truncated to the cap.
    pub fn record_watch(&mut self, entry: HistoryEntry) {
        self.history.retain(|e| e.video_id != entry.video_id);
        self.history.insert(0, entry);
        self.history.truncate(HISTORY_CAP);
    }

    /// Remove the entry with the given watched-at timestamp.
    /// Returns false if no entry matched.
    pub fn remove_history(&mut self, watched_at: &str) -> bool {
        let before = self.history.len();
        self.history.retain(|e| e.watched_at != watched_at);
        self.history.len() != before
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ─── Library ─────────────────────────────────────────────────

    pub fn in_library(&self, video_id: &str) -> bool {
        self.library.iter().any(|e| e.video_id == video_id)
    }

    /// Save a video. Idempotent: saving an already-present video id is a
    /// no-op, regardless of title/thumbnail drift. Returns true if added.
    pub fn save_to_library(&mut self, entry: LibraryEntry) -> bool {
        if self.in_library(&entry.video_id) {
            return false;
        }
        self.library.push(entry);
        true
    }

    /// Returns true if an entry was removed.
    pub fn remove_from_library(&mut self, video_id: &str) -> bool {
        let before = self.library.len();
        self.library.retain(|e| e.video_id != video_id);
        self.library.len() != before
    }

    /// Toggle membership; returns the new state (true = now saved).
    pub fn toggle_library(&mut self, entry: LibraryEntry) -> bool {
        if self.remove_from_library(&entry.video_id) {
            false
        } else {
            self.library.push(entry);
            true
        }
    }

    // ─── Subscriptions ───────────────────────────────────────────

    pub fn is_subscribed(&self, channel_id: &str) -> bool {
        self.subscriptions.iter().any(|c| c == channel_id)
    }

    /// Toggle a channel subscription; returns the new state.
    /// The list is a strict set: no duplicate channel ids.
    pub fn toggle_subscription(&mut self, channel_id: &str) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|c| c != channel_id);
        if self.subscriptions.len() != before {
            false
        } else {
            self.subscriptions.push(channel_id.to_string());
            true
        }
    }

    /// Returns true if the channel was subscribed.
    pub fn unsubscribe(&mut self, channel_id: &str) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|c| c != channel_id);
        self.subscriptions.len() != before
    }
}
