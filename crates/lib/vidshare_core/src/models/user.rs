//! Identity domain models.
//!
//! `UserRecord` is the full row and only ever flows through the auth code.
//! Everything that leaves the core crate uses `PublicUser`, which has no
//! password hash or refresh token to leak.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Full identity row, including credentials.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar: String,
    pub cover_image: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Drop the credential fields.
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username,
            email: self.email,
            fullname: self.fullname,
            avatar: self.avatar,
            cover_image: self.cover_image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Identity without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar: String,
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an identity. Username and email must already be
/// normalized and the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar: String,
    pub cover_image: String,
    pub password_hash: String,
}

/// Lower-case and trim a username or email for storage and lookup.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn public_projection_has_no_credentials() {
        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            fullname: "Alice".into(),
            avatar: "https://media.test/a.png".into(),
            cover_image: String::new(),
            password_hash: "$2b$10$hash".into(),
            refresh_token: Some("token".into()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(record.into_public()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password_hash"));
        assert!(!obj.contains_key("refresh_token"));
        assert_eq!(obj["username"], "alice");
    }
}
