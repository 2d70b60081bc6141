//! PostgreSQL-backed `UserStore`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, UserStore};
use crate::auth::queries;
use crate::channel::queries as channel_queries;
use crate::models::channel::{ChannelProfile, WatchedVideo};
use crate::models::user::{NewUser, PublicUser, UserRecord};

/// `UserStore` over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        Ok(queries::find_user_by_id(&self.pool, id).await?)
    }

    async fn find_public_user(&self, id: Uuid) -> StoreResult<Option<PublicUser>> {
        Ok(queries::find_public_user(&self.pool, id).await?)
    }

    async fn find_user_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> StoreResult<Option<UserRecord>> {
        Ok(queries::find_user_by_login(&self.pool, username, email).await?)
    }

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        Ok(queries::user_exists(&self.pool, username, email).await?)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<PublicUser> {
        Ok(queries::create_user(&self.pool, &user).await?)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> StoreResult<bool> {
        Ok(queries::set_refresh_token(&self.pool, id, token).await?)
    }

    async fn swap_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        token: &str,
    ) -> StoreResult<bool> {
        Ok(queries::swap_refresh_token(&self.pool, id, expected, token).await?)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        Ok(queries::update_password(&self.pool, id, password_hash).await?)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        fullname: &str,
        email: &str,
    ) -> StoreResult<Option<PublicUser>> {
        Ok(queries::update_profile(&self.pool, id, fullname, email).await?)
    }

    async fn update_avatar(&self, id: Uuid, url: &str) -> StoreResult<Option<PublicUser>> {
        Ok(queries::update_avatar(&self.pool, id, url).await?)
    }

    async fn update_cover_image(&self, id: Uuid, url: &str) -> StoreResult<Option<PublicUser>> {
        Ok(queries::update_cover_image(&self.pool, id, url).await?)
    }

    async fn channel_profile(
        &self,
        viewer: Uuid,
        username: &str,
    ) -> StoreResult<Option<ChannelProfile>> {
        Ok(channel_queries::channel_profile(&self.pool, viewer, username).await?)
    }

    async fn watch_history(&self, user: Uuid) -> StoreResult<Vec<WatchedVideo>> {
        Ok(channel_queries::watch_history(&self.pool, user).await?)
    }
}
