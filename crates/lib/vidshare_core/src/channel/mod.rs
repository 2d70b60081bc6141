//! Channel profile and watch-history read queries.
//!
//! Pure reads composed over the store; each call is bounded by a timeout.

pub mod queries;

use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::channel::{ChannelProfile, WatchedVideo};
use crate::models::user::normalize;
use crate::store::{StoreError, UserStore};

/// Default bound for aggregation queries.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Read query errors.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Channel view of `username` as seen by `viewer`.
pub async fn channel_profile(
    store: &dyn UserStore,
    viewer: Uuid,
    username: &str,
    timeout: Duration,
) -> Result<ChannelProfile, QueryError> {
    let username = normalize(username);
    if username.is_empty() {
        return Err(QueryError::Validation("Username is required".into()));
    }
    let profile = tokio::time::timeout(timeout, store.channel_profile(viewer, &username))
        .await
        .map_err(|_| {
            warn!(%username, "channel profile query timed out");
            QueryError::Timeout(timeout)
        })??;
    profile.ok_or_else(|| QueryError::NotFound("Channel does not exist".into()))
}

/// Watch history of `viewer`, oldest entry first.
pub async fn watch_history(
    store: &dyn UserStore,
    viewer: Uuid,
    timeout: Duration,
) -> Result<Vec<WatchedVideo>, QueryError> {
    let history = tokio::time::timeout(timeout, store.watch_history(viewer))
        .await
        .map_err(|_| {
            warn!(%viewer, "watch history query timed out");
            QueryError::Timeout(timeout)
        })??;
    Ok(history)
}
