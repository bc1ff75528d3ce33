// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod user;
pub mod video;

pub use user::{HistoryEntry, LibraryEntry, UserDoc};
pub use video::{
    Activity, ActivityContentDetails, ActivityUpload, Channel, ChannelSnippet, ListResponse,
    Snippet, Thumbnail, Thumbnails, Video, VideoId,
};
