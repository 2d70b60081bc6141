//! Profile maintenance for the authenticated identity.

use tracing::info;
use uuid::Uuid;
use vidshare_core::models::user::{PublicUser, normalize};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::services::uploads::SpooledFile;

/// Update fullname and email.
pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    fullname: Option<&str>,
    email: Option<&str>,
) -> AppResult<PublicUser> {
    let fullname = fullname.map(str::trim).filter(|f| !f.is_empty());
    let email = email.map(normalize).filter(|e| !e.is_empty());
    let (Some(fullname), Some(email)) = (fullname, email) else {
        return Err(AppError::Validation("All fields are required".into()));
    };

    state
        .store
        .update_profile(user_id, fullname, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Which profile image to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Avatar,
    CoverImage,
}

impl ImageSlot {
    /// Multipart field carrying the file.
    pub fn field(self) -> &'static str {
        match self {
            ImageSlot::Avatar => "avatar",
            ImageSlot::CoverImage => "coverImage",
        }
    }
}

/// Upload a new avatar or cover image and store its URL.
pub async fn update_image(
    state: &AppState,
    user_id: Uuid,
    slot: ImageSlot,
    file: Option<&SpooledFile>,
) -> AppResult<PublicUser> {
    let file = file.ok_or_else(|| match slot {
        ImageSlot::Avatar => AppError::Validation("Avatar is required".into()),
        ImageSlot::CoverImage => AppError::Validation("Cover image is required".into()),
    })?;

    let uploaded = state.media.upload(file.path()).await?;

    let updated = match slot {
        ImageSlot::Avatar => state.store.update_avatar(user_id, &uploaded.url).await?,
        ImageSlot::CoverImage => {
            state
                .store
                .update_cover_image(user_id, &uploaded.url)
                .await?
        }
    };
    let user = updated.ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!(
        %user_id,
        ?slot,
        url = %uploaded.url,
        public_id = ?uploaded.public_id,
        "profile image updated"
    );
    Ok(user)
}
