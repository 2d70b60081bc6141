//! Session middleware: access token extraction and verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::debug;
use vidshare_core::models::user::PublicUser;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::ACCESS_COOKIE;

/// The identity resolved from the access token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub PublicUser);

/// Locate the access token: the `accessToken` cookie wins over an
/// `Authorization: Bearer` header.
fn extract_token(jar: &CookieJar, request: &Request) -> Option<String> {
    if let Some(cookie) = jar.get(ACCESS_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Axum middleware: verifies the access token, loads the identity (without
/// credentials) and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, &request)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    let user_id = state.tokens.verify_access_token(&token)?;

    let user = state
        .store
        .find_public_user(user_id)
        .await?
        .ok_or_else(|| {
            debug!(%user_id, "access token for missing identity");
            AppError::Unauthorized("Invalid access token".into())
        })?;

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}
