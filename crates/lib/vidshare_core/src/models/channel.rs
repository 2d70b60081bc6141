//! Read-side projections for channels and watch history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Public channel view with derived subscription figures.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ChannelProfile {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub avatar: String,
    pub cover_image: String,
    pub subscribers_count: i64,
    pub channels_subscribed_to_count: i64,
    /// Whether the viewer subscribes to this channel.
    pub is_subscribed: bool,
}

/// Minimal owner projection embedded in each watched video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSummary {
    pub fullname: String,
    pub username: String,
    pub avatar: String,
}

/// Video row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// One watch-history entry: the video with its owner resolved inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchedVideo {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub owner: OwnerSummary,
}

impl WatchedVideo {
    /// Join a video with its owner's projection.
    pub fn from_parts(video: Video, owner: OwnerSummary) -> Self {
        Self {
            id: video.id,
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            owner,
        }
    }
}
