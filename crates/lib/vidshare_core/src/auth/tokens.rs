//! Session token service: issues, verifies, rotates and revokes paired
//! access/refresh tokens.
//!
//! Each identity holds at most one valid refresh token: the one stored on its
//! row. Issuing a new pair overwrites it, logging out clears it, and a
//! presented refresh token is only honoured if it equals the stored value.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::{AuthError, jwt};
use crate::models::auth::{AccessClaims, RefreshClaims, TokenPair};
use crate::models::user::UserRecord;
use crate::store::UserStore;

/// Default access token lifetime: 1 day.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 24 * 60 * 60;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Signing secrets and lifetimes for both token kinds.
#[derive(Clone, Debug)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl TokenSettings {
    /// Settings with the default lifetimes.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }

    fn validate(&self) -> Result<(), AuthError> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(AuthError::ValidationError(
                "token secrets must not be empty".into(),
            ));
        }
        if self.access_secret == self.refresh_secret {
            return Err(AuthError::ValidationError(
                "access and refresh secrets must differ".into(),
            ));
        }
        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err(AuthError::ValidationError(
                "token lifetimes must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Issues and validates session tokens against a `UserStore`.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn UserStore>,
    settings: Arc<TokenSettings>,
}

impl TokenService {
    /// Build a token service. Fails if the settings are unusable.
    pub fn new(store: Arc<dyn UserStore>, settings: TokenSettings) -> Result<Self, AuthError> {
        settings.validate()?;
        Ok(Self {
            store,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Sign a fresh pair for `user` without persisting anything.
    fn mint(&self, user: &UserRecord) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access = AccessClaims {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + Duration::seconds(self.settings.access_ttl_secs)).timestamp(),
            iat: now.timestamp(),
        };
        let refresh = RefreshClaims {
            id: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + Duration::seconds(self.settings.refresh_ttl_secs)).timestamp(),
            iat: now.timestamp(),
        };
        Ok(TokenPair {
            access_token: jwt::sign(&access, self.settings.access_secret.as_bytes())?,
            refresh_token: jwt::sign(&refresh, self.settings.refresh_secret.as_bytes())?,
        })
    }

    /// Mint a token pair for `user_id` and store the refresh token, replacing
    /// (and thereby invalidating) any previous one.
    pub async fn issue_token_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".into()))?;

        let pair = self.mint(&user)?;

        match self
            .store
            .set_refresh_token(user_id, Some(&pair.refresh_token))
            .await
        {
            Ok(true) => {
                debug!(%user_id, "issued token pair");
                Ok(pair)
            }
            Ok(false) => Err(AuthError::NotFound("User not found".into())),
            Err(e) => {
                error!(%user_id, error = %e, "failed to persist refresh token");
                Err(AuthError::TokenIssuance(e.to_string()))
            }
        }
    }

    /// Verify an access token and return the identity it was issued for.
    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims =
            jwt::verify::<AccessClaims>(token, self.settings.access_secret.as_bytes())
                .ok_or_else(|| AuthError::Unauthorized("Invalid or expired access token".into()))?;
        Uuid::parse_str(&claims.id)
            .map_err(|_| AuthError::Unauthorized("Invalid access token".into()))
    }

    /// Exchange a refresh token for a new pair (single use).
    ///
    /// The presented token must verify and equal the stored one. The new
    /// refresh token is written with a compare-and-swap on the presented
    /// value, so of two concurrent rotations with the same token only one
    /// succeeds.
    pub async fn rotate_on_refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims =
            jwt::verify::<RefreshClaims>(refresh_token, self.settings.refresh_secret.as_bytes())
                .ok_or_else(|| AuthError::Unauthorized("Invalid refresh token".into()))?;
        let user_id = Uuid::parse_str(&claims.id)
            .map_err(|_| AuthError::Unauthorized("Invalid refresh token".into()))?;

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("Invalid refresh token".into()))?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            warn!(%user_id, "superseded refresh token presented");
            return Err(AuthError::Unauthorized(
                "Refresh token is expired or used".into(),
            ));
        }

        let pair = self.mint(&user)?;
        let swapped = self
            .store
            .swap_refresh_token(user_id, refresh_token, &pair.refresh_token)
            .await
            .map_err(|e| {
                error!(%user_id, error = %e, "failed to persist rotated refresh token");
                AuthError::TokenIssuance(e.to_string())
            })?;
        if !swapped {
            warn!(%user_id, "lost refresh token rotation race");
            return Err(AuthError::Unauthorized(
                "Refresh token is expired or used".into(),
            ));
        }

        debug!(%user_id, "rotated refresh token");
        Ok(pair)
    }

    /// Clear the stored refresh token. Outstanding access tokens stay valid
    /// until they expire.
    pub async fn revoke(&self, user_id: Uuid) -> Result<(), AuthError> {
        if !self.store.set_refresh_token(user_id, None).await? {
            return Err(AuthError::NotFound("User not found".into()));
        }
        debug!(%user_id, "revoked refresh token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::store::MemoryStore;

    async fn setup() -> (Arc<MemoryStore>, TokenService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser {
                username: "alice".into(),
                email: "alice@example.com".into(),
                fullname: "Alice".into(),
                avatar: "https://media.test/alice.png".into(),
                cover_image: String::new(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let service = TokenService::new(
            store.clone(),
            TokenSettings::new("access-secret", "refresh-secret"),
        )
        .unwrap();
        (store, service, user.id)
    }

    #[tokio::test]
    async fn access_token_verifies_to_issuing_identity() {
        let (_, service, id) = setup().await;
        let pair = service.issue_token_pair(id).await.unwrap();
        assert_eq!(service.verify_access_token(&pair.access_token).unwrap(), id);
    }

    #[tokio::test]
    async fn issue_stores_refresh_token() {
        let (store, service, id) = setup().await;
        let pair = service.issue_token_pair(id).await.unwrap();
        let user = store.find_user(id).await.unwrap().unwrap();
        assert_eq!(user.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn issue_for_unknown_identity_is_not_found() {
        let (_, service, _) = setup().await;
        let err = service.issue_token_pair(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn refresh_token_is_single_use() {
        let (_, service, id) = setup().await;
        let pair = service.issue_token_pair(id).await.unwrap();

        let rotated = service.rotate_on_refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let err = service
            .rotate_on_refresh(&pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));

        // The rotated token is the live one now.
        service.rotate_on_refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn reissue_invalidates_previous_refresh_token() {
        let (_, service, id) = setup().await;
        let first = service.issue_token_pair(id).await.unwrap();
        let _second = service.issue_token_pair(id).await.unwrap();
        assert!(service.rotate_on_refresh(&first.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn revoke_invalidates_refresh_token() {
        let (store, service, id) = setup().await;
        let pair = service.issue_token_pair(id).await.unwrap();
        service.revoke(id).await.unwrap();

        let user = store.find_user(id).await.unwrap().unwrap();
        assert!(user.refresh_token.is_none());

        let err = service
            .rotate_on_refresh(&pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));

        // Access tokens survive logout until they expire.
        assert_eq!(service.verify_access_token(&pair.access_token).unwrap(), id);
    }

    #[tokio::test]
    async fn concurrent_rotation_has_one_winner() {
        let (_, service, id) = setup().await;
        let pair = service.issue_token_pair(id).await.unwrap();

        let (a, b) = tokio::join!(
            service.rotate_on_refresh(&pair.refresh_token),
            service.rotate_on_refresh(&pair.refresh_token),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    }

    #[tokio::test]
    async fn token_kinds_are_not_interchangeable() {
        let (_, service, id) = setup().await;
        let pair = service.issue_token_pair(id).await.unwrap();
        assert!(service.verify_access_token(&pair.refresh_token).is_err());
        assert!(service.rotate_on_refresh(&pair.access_token).await.is_err());
    }

    #[tokio::test]
    async fn expired_access_token_is_rejected() {
        let (_, service, id) = setup().await;
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            id: id.to_string(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            jti: Uuid::new_v4().to_string(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = jwt::sign(&claims, b"access-secret").unwrap();
        assert!(matches!(
            service.verify_access_token(&token),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn just_expired_tokens_get_no_grace_period() {
        let (store, service, id) = setup().await;
        let now = Utc::now().timestamp();
        let access = AccessClaims {
            id: id.to_string(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            jti: Uuid::new_v4().to_string(),
            exp: now - 30,
            iat: now - 90,
        };
        let token = jwt::sign(&access, b"access-secret").unwrap();
        assert!(matches!(
            service.verify_access_token(&token),
            Err(AuthError::Unauthorized(_))
        ));

        let refresh = RefreshClaims {
            id: id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: now - 30,
            iat: now - 90,
        };
        let token = jwt::sign(&refresh, b"refresh-secret").unwrap();
        store.set_refresh_token(id, Some(&token)).await.unwrap();
        assert!(matches!(
            service.rotate_on_refresh(&token).await,
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn refresh_for_deleted_identity_is_unauthorized() {
        let (store, service, id) = setup().await;
        let pair = service.issue_token_pair(id).await.unwrap();
        store.delete_user(id).await;
        assert!(matches!(
            service.rotate_on_refresh(&pair.refresh_token).await,
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn identical_secrets_are_rejected() {
        let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
        let result = TokenService::new(store, TokenSettings::new("same", "same"));
        assert!(matches!(result, Err(AuthError::ValidationError(_))));
    }
}
