//! Identity store abstraction.
//!
//! `UserStore` is the seam between the auth/query logic and persistence.
//! `PgStore` backs it with PostgreSQL; `MemoryStore` keeps everything in
//! process for tests and local development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::channel::{ChannelProfile, WatchedVideo};
use crate::models::user::{NewUser, PublicUser, UserRecord};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Duplicate value for {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e
            && db.is_unique_violation()
        {
            let field = match db.constraint() {
                Some(c) if c.contains("username") => "username",
                Some(c) if c.contains("email") => "email",
                Some(c) => c,
                None => "value",
            };
            return StoreError::Conflict(field.to_string());
        }
        StoreError::Db(e)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations needed by the auth flows and read queries.
///
/// Single-row writes are atomic; `swap_refresh_token` is a compare-and-swap
/// so concurrent rotations of the same token cannot both succeed.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> StoreResult<()>;

    /// Fetch the full identity row, credentials included.
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;

    /// Fetch the identity without credentials.
    async fn find_public_user(&self, id: Uuid) -> StoreResult<Option<PublicUser>>;

    /// Look up by username or email (both already normalized).
    async fn find_user_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> StoreResult<Option<UserRecord>>;

    /// Whether the username or the email is already taken.
    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool>;

    async fn create_user(&self, user: NewUser) -> StoreResult<PublicUser>;

    /// Overwrite the stored refresh token. Returns `false` if the identity
    /// does not exist.
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> StoreResult<bool>;

    /// Replace the stored refresh token only if it still equals `expected`.
    async fn swap_refresh_token(&self, id: Uuid, expected: &str, token: &str)
    -> StoreResult<bool>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool>;

    async fn update_profile(
        &self,
        id: Uuid,
        fullname: &str,
        email: &str,
    ) -> StoreResult<Option<PublicUser>>;

    async fn update_avatar(&self, id: Uuid, url: &str) -> StoreResult<Option<PublicUser>>;

    async fn update_cover_image(&self, id: Uuid, url: &str) -> StoreResult<Option<PublicUser>>;

    /// Channel view of `username` as seen by `viewer`.
    async fn channel_profile(
        &self,
        viewer: Uuid,
        username: &str,
    ) -> StoreResult<Option<ChannelProfile>>;

    /// Watched videos of `user` in history order, owners resolved.
    async fn watch_history(&self, user: Uuid) -> StoreResult<Vec<WatchedVideo>>;
}
