//! Identity and refresh-token database queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{NewUser, PublicUser, UserRecord};

const USER_COLUMNS: &str = "id, username, email, fullname, avatar, cover_image, \
     password_hash, refresh_token, created_at, updated_at";

const PUBLIC_COLUMNS: &str =
    "id, username, email, fullname, avatar, cover_image, created_at, updated_at";

/// Fetch a user row by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fetch a user by ID without credential columns.
pub async fn find_public_user(pool: &PgPool, id: Uuid) -> Result<Option<PublicUser>, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(&format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fetch a user matching the username or the email, whichever is given.
pub async fn find_user_by_login(
    pool: &PgPool,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users \
         WHERE ($1::text IS NOT NULL AND username = $1) \
            OR ($2::text IS NOT NULL AND email = $2) \
         LIMIT 1"
    ))
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Check whether the username or email is already registered.
pub async fn user_exists(pool: &PgPool, username: &str, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
}

/// Insert a new user, returning its public projection.
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<PublicUser, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(&format!(
        "INSERT INTO users (username, email, fullname, avatar, cover_image, password_hash) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {PUBLIC_COLUMNS}"
    ))
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.fullname)
    .bind(&user.avatar)
    .bind(&user.cover_image)
    .bind(&user.password_hash)
    .fetch_one(pool)
    .await
}

/// Overwrite (or clear) the stored refresh token. Returns whether a row matched.
pub async fn set_refresh_token(
    pool: &PgPool,
    id: Uuid,
    token: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Replace the stored refresh token only if it still equals `expected`.
pub async fn swap_refresh_token(
    pool: &PgPool,
    id: Uuid,
    expected: &str,
    token: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET refresh_token = $3 WHERE id = $1 AND refresh_token = $2")
            .bind(id)
            .bind(expected)
            .bind(token)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() == 1)
}

/// Store a new password hash.
pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() == 1)
}

/// Update fullname and email.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    fullname: &str,
    email: &str,
) -> Result<Option<PublicUser>, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(&format!(
        "UPDATE users SET fullname = $2, email = $3, updated_at = now() \
         WHERE id = $1 RETURNING {PUBLIC_COLUMNS}"
    ))
    .bind(id)
    .bind(fullname)
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Set the avatar URI.
pub async fn update_avatar(
    pool: &PgPool,
    id: Uuid,
    url: &str,
) -> Result<Option<PublicUser>, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(&format!(
        "UPDATE users SET avatar = $2, updated_at = now() WHERE id = $1 RETURNING {PUBLIC_COLUMNS}"
    ))
    .bind(id)
    .bind(url)
    .fetch_optional(pool)
    .await
}

/// Set the cover image URI.
pub async fn update_cover_image(
    pool: &PgPool,
    id: Uuid,
    url: &str,
) -> Result<Option<PublicUser>, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(&format!(
        "UPDATE users SET cover_image = $2, updated_at = now() \
         WHERE id = $1 RETURNING {PUBLIC_COLUMNS}"
    ))
    .bind(id)
    .bind(url)
    .fetch_optional(pool)
    .await
}
