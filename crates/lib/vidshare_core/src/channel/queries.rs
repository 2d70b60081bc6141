//! Channel and watch-history aggregation queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::channel::{ChannelProfile, OwnerSummary, Video, WatchedVideo};

/// Resolve a channel by username with its subscription figures.
///
/// `is_subscribed` is true iff `viewer` has an edge to the channel.
pub async fn channel_profile(
    pool: &PgPool,
    viewer: Uuid,
    username: &str,
) -> Result<Option<ChannelProfile>, sqlx::Error> {
    sqlx::query_as::<_, ChannelProfile>(
        r#"
        SELECT
            u.id,
            u.fullname,
            u.username,
            u.avatar,
            u.cover_image,
            (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id)
                AS subscribers_count,
            (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id)
                AS channels_subscribed_to_count,
            EXISTS(
                SELECT 1 FROM subscriptions s
                WHERE s.channel_id = u.id AND s.subscriber_id = $2
            ) AS is_subscribed
        FROM users u
        WHERE u.username = $1
        "#,
    )
    .bind(username)
    .bind(viewer)
    .fetch_optional(pool)
    .await
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    owner_id: Uuid,
    video_file: String,
    thumbnail: String,
    title: String,
    description: String,
    duration: f64,
    views: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
    owner_fullname: String,
    owner_username: String,
    owner_avatar: String,
}

/// Watched videos for a user in append order, each with its owner.
///
/// Entries whose video or owner no longer exists drop out of the join.
pub async fn watch_history(pool: &PgPool, user: Uuid) -> Result<Vec<WatchedVideo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT
            v.id, v.owner_id, v.video_file, v.thumbnail, v.title, v.description,
            v.duration, v.views, v.is_published, v.created_at,
            o.fullname AS owner_fullname,
            o.username AS owner_username,
            o.avatar AS owner_avatar
        FROM watch_history h
        JOIN videos v ON v.id = h.video_id
        JOIN users o ON o.id = v.owner_id
        WHERE h.user_id = $1
        ORDER BY h.position
        "#,
    )
    .bind(user)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            WatchedVideo::from_parts(
                Video {
                    id: r.id,
                    owner_id: r.owner_id,
                    video_file: r.video_file,
                    thumbnail: r.thumbnail,
                    title: r.title,
                    description: r.description,
                    duration: r.duration,
                    views: r.views,
                    is_published: r.is_published,
                    created_at: r.created_at,
                },
                OwnerSummary {
                    fullname: r.owner_fullname,
                    username: r.owner_username,
                    avatar: r.owner_avatar,
                },
            )
        })
        .collect())
}
