//! # vidshare_api
//!
//! HTTP API library for vidshare: account, session and channel endpoints
//! over a [`UserStore`] and a [`MediaStore`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vidshare_core::auth::TokenService;
use vidshare_core::media::MediaStore;
use vidshare_core::store::UserStore;

use crate::config::ApiConfig;
use crate::handlers::{auth, channels, health, users};

/// Mount point for the user routes.
pub const USERS_PREFIX: &str = "/api/v1/users";

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity, subscription and history persistence.
    pub store: Arc<dyn UserStore>,
    /// Token issuance, verification and rotation.
    pub tokens: TokenService,
    /// Avatar and cover image uploads.
    pub media: Arc<dyn MediaStore>,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `vidshare_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    vidshare_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/refresh-token", post(auth::refresh_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/logout", post(auth::logout_handler))
        .route("/change-password", post(auth::change_password_handler))
        .route("/current-user", get(users::current_user_handler))
        .route("/update-profile", patch(users::update_profile_handler))
        .route("/avatar", patch(users::update_avatar_handler))
        .route("/cover-image", patch(users::update_cover_image_handler))
        .route("/channel/{username}", get(channels::channel_profile_handler))
        .route("/history", get(channels::watch_history_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let mut app = Router::new()
        .route("/api/v1/healthcheck", get(health::healthcheck_handler))
        .nest(USERS_PREFIX, public.merge(protected));

    if let Some(dir) = &state.config.media_dir {
        app = app.nest_service("/media", ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
