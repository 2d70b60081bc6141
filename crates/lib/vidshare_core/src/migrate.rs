//! Database migration support.
//!
//! Embeds and runs the SQL migrations in `vidshare_core/migrations/`
//! (users, videos, subscriptions, watch history).

use sqlx::PgPool;

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
