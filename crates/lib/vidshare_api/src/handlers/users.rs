//! Profile request handlers for the authenticated identity.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, UpdateProfileRequest, UserData};
use crate::services::users::{self, ImageSlot};
use crate::services::uploads;

/// `GET /current-user`
pub async fn current_user_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<UserData>>> {
    Ok(Json(ApiResponse::ok(
        UserData {
            user: user.0.into(),
        },
        "Current user fetched successfully",
    )))
}

/// `PATCH /update-profile`: change fullname and email.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UserData>>> {
    let Json(body) = payload?;
    let updated = users::update_profile(
        &state,
        user.0.id,
        body.fullname.as_deref(),
        body.email.as_deref(),
    )
    .await?;
    Ok(Json(ApiResponse::ok(
        UserData {
            user: updated.into(),
        },
        "Profile updated successfully",
    )))
}

async fn update_image(
    state: AppState,
    user: AuthenticatedUser,
    multipart: Multipart,
    slot: ImageSlot,
) -> AppResult<Json<ApiResponse<UserData>>> {
    let form = uploads::read_multipart(multipart, &state.config.upload_dir).await?;
    let updated = users::update_image(&state, user.0.id, slot, form.file(slot.field())).await?;
    let message = match slot {
        ImageSlot::Avatar => "Avatar updated successfully",
        ImageSlot::CoverImage => "Cover image updated successfully",
    };
    Ok(Json(ApiResponse::ok(
        UserData {
            user: updated.into(),
        },
        message,
    )))
}

/// `PATCH /avatar` (multipart field `avatar`)
pub async fn update_avatar_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UserData>>> {
    update_image(state, user, multipart, ImageSlot::Avatar).await
}

/// `PATCH /cover-image` (multipart field `coverImage`)
pub async fn update_cover_image_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UserData>>> {
    update_image(state, user, multipart, ImageSlot::CoverImage).await
}
