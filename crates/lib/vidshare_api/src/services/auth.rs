//! Authentication service: registration, login, refresh, logout and
//! password change, delegating token work to `vidshare_core::auth`.

use tracing::{info, warn};
use uuid::Uuid;
use vidshare_core::auth::password::{check_password_policy, hash_password, verify_password};
use vidshare_core::models::auth::TokenPair;
use vidshare_core::models::user::{NewUser, PublicUser, normalize};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::services::uploads::{MultipartForm, required_field};

/// Register a new identity from a multipart form.
///
/// Media is uploaded before the row is created, so a failed upload never
/// leaves an identity without its avatar.
pub async fn register(state: &AppState, form: &MultipartForm) -> AppResult<PublicUser> {
    let fullname = required_field(form, "fullname")?;
    let username = normalize(required_field(form, "username")?);
    let email = normalize(required_field(form, "email")?);
    let password = form.field("password").unwrap_or_default();
    if password.trim().is_empty() {
        return Err(AppError::Validation("All fields are required".into()));
    }
    check_password_policy(password)?;

    if state.store.user_exists(&username, &email).await? {
        return Err(AppError::Conflict("Username or email already exists".into()));
    }

    let avatar = form
        .file("avatar")
        .ok_or_else(|| AppError::Validation("Avatar is required".into()))?;
    let avatar = state.media.upload(avatar.path()).await?;
    let cover_image = match form.file("coverImage") {
        Some(file) => match state.media.upload(file.path()).await {
            Ok(cover) => cover.url,
            Err(e) => {
                warn!(
                    url = %avatar.url,
                    public_id = ?avatar.public_id,
                    "cover image upload failed, uploaded avatar is orphaned"
                );
                return Err(e.into());
            }
        },
        None => String::new(),
    };

    let password_hash = hash_password(password)?;
    let created = state
        .store
        .create_user(NewUser {
            username,
            email,
            fullname: fullname.to_string(),
            avatar: avatar.url.clone(),
            cover_image,
            password_hash,
        })
        .await;
    let user = match created {
        Ok(user) => user,
        Err(e) => {
            warn!(
                url = %avatar.url,
                public_id = ?avatar.public_id,
                "registration failed after upload, uploaded avatar is orphaned"
            );
            return Err(e.into());
        }
    };

    info!(
        user_id = %user.id,
        username = %user.username,
        avatar_id = ?avatar.public_id,
        "registered user"
    );
    Ok(user)
}

/// Authenticate with username or email plus password and issue a token pair.
pub async fn login(
    state: &AppState,
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<(PublicUser, TokenPair)> {
    let username = username.map(normalize).filter(|u| !u.is_empty());
    let email = email.map(normalize).filter(|e| !e.is_empty());
    if username.is_none() && email.is_none() {
        return Err(AppError::Validation("Username or email is required".into()));
    }
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Password is required".into()))?;

    let user = state
        .store
        .find_user_by_login(username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let pair = state.tokens.issue_token_pair(user.id).await?;
    info!(user_id = %user.id, "user logged in");
    Ok((user.into_public(), pair))
}

/// Exchange a refresh token for a fresh pair.
pub async fn refresh(state: &AppState, refresh_token: Option<&str>) -> AppResult<TokenPair> {
    let token = refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;
    Ok(state.tokens.rotate_on_refresh(token).await?)
}

/// Logout: clear the stored refresh token.
pub async fn logout(state: &AppState, user_id: Uuid) -> AppResult<()> {
    state.tokens.revoke(user_id).await?;
    info!(%user_id, "user logged out");
    Ok(())
}

/// Change the password after checking the current one.
pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    old_password: Option<&str>,
    new_password: Option<&str>,
) -> AppResult<()> {
    let (Some(old_password), Some(new_password)) = (
        old_password.filter(|p| !p.is_empty()),
        new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Old and new passwords are required".into(),
        ));
    };
    check_password_policy(new_password)?;

    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(old_password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid old password".into()));
    }

    let hash = hash_password(new_password)?;
    if !state.store.update_password(user_id, &hash).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(%user_id, "password changed");
    Ok(())
}
