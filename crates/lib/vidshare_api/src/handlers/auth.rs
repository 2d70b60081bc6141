//! Authentication request handlers.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ApiResponse, ChangePasswordRequest, LoginData, LoginRequest, RefreshRequest, TokenData,
    UserData,
};
use crate::services::cookies::{REFRESH_COOKIE, clear_token_cookies, set_token_cookies};
use crate::services::{auth, uploads};

/// `POST /register`: create an account (multipart, avatar required).
pub async fn register_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UserData>>)> {
    let form = uploads::read_multipart(multipart, &state.config.upload_dir).await?;
    let user = auth::register(&state, &form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            201,
            UserData { user: user.into() },
            "User created successfully",
        )),
    ))
}

/// `POST /login`: authenticate and set the token cookies.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<ApiResponse<LoginData>>)> {
    let Json(body) = payload?;
    let (user, pair) = auth::login(
        &state,
        body.username.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
    )
    .await?;
    let jar = set_token_cookies(jar, &pair, &state.config.tokens, state.config.cookie_secure);
    Ok((
        jar,
        Json(ApiResponse::ok(
            LoginData {
                user: user.into(),
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "User logged in successfully",
        )),
    ))
}

/// `POST /logout`: revoke the refresh token and clear cookies.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse<()>>)> {
    auth::logout(&state, user.0.id).await?;
    let jar = clear_token_cookies(jar, state.config.cookie_secure);
    Ok((jar, Json(ApiResponse::ok((), "User logged out successfully"))))
}

/// `POST /refresh-token`: rotate the token pair. The refresh token comes
/// from the `refreshToken` cookie or the JSON body.
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> AppResult<(CookieJar, Json<ApiResponse<TokenData>>)> {
    let from_cookie = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let token = match from_cookie {
        Some(token) => Some(token),
        None if body.is_empty() => None,
        None => {
            serde_json::from_slice::<RefreshRequest>(&body)
                .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))?
                .refresh_token
        }
    };

    let pair = auth::refresh(&state, token.as_deref()).await?;
    let jar = set_token_cookies(jar, &pair, &state.config.tokens, state.config.cookie_secure);
    Ok((
        jar,
        Json(ApiResponse::ok(
            TokenData {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "Refreshed access token successfully",
        )),
    ))
}

/// `POST /change-password`
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(body) = payload?;
    auth::change_password(
        &state,
        user.0.id,
        body.old_password.as_deref(),
        body.new_password.as_deref(),
    )
    .await?;
    Ok(Json(ApiResponse::ok((), "Password changed successfully")))
}
