//! Channel profile and watch-history handlers.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use vidshare_core::channel;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, ChannelProfileResponse, WatchedVideoResponse};

/// `GET /channel/{username}`
pub async fn channel_profile_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<ChannelProfileResponse>>> {
    let profile = channel::channel_profile(
        state.store.as_ref(),
        viewer.0.id,
        &username,
        state.config.query_timeout,
    )
    .await?;
    Ok(Json(ApiResponse::ok(
        profile.into(),
        "Channel profile fetched successfully",
    )))
}

/// `GET /history`
pub async fn watch_history_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Vec<WatchedVideoResponse>>>> {
    let history =
        channel::watch_history(state.store.as_ref(), viewer.0.id, state.config.query_timeout)
            .await?;
    Ok(Json(ApiResponse::ok(
        history.into_iter().map(Into::into).collect(),
        "Watch history fetched successfully",
    )))
}
