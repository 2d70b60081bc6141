//! JWT signing and verification, plus secret resolution.

use std::path::{Path, PathBuf};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::AuthError;

/// Sign claims as an HS256 JWT.
pub fn sign<C: Serialize>(claims: &C, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify an HS256 JWT (signature and `exp`), returning the claims on success.
pub fn verify<C: DeserializeOwned>(token: &str, secret: &[u8]) -> Option<C> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;
    decode::<C>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Resolve a signing secret: env var `env_var` → persisted file `file_name`
/// under the data dir → freshly generated (and persisted).
pub fn resolve_secret(env_var: &str, file_name: &str) -> String {
    if let Ok(secret) = std::env::var(env_var)
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = secret_path(file_name);
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match persist_secret(&secret_path, &secret) {
        Ok(()) => {
            info!(path = %secret_path.display(), env_var, "generated new token secret");
        }
        Err(e) => {
            warn!(
                path = %secret_path.display(),
                env_var,
                error = %e,
                "generated token secret could not be persisted; sessions will not survive a restart"
            );
        }
    }
    secret
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

/// Path to a persisted secret file.
fn secret_path(file_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidshare")
        .join(file_name)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let claims = Claims {
            sub: "x".into(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = sign(&claims, b"one").unwrap();
        assert_eq!(verify::<Claims>(&token, b"one"), Some(claims));
        assert!(verify::<Claims>(&token, b"two").is_none());
    }

    #[test]
    fn verify_rejects_expired() {
        let claims = Claims {
            sub: "x".into(),
            exp: Utc::now().timestamp() - 3600,
        };
        let token = sign(&claims, b"one").unwrap();
        assert!(verify::<Claims>(&token, b"one").is_none());
    }

    #[test]
    fn verify_has_no_leeway() {
        let claims = Claims {
            sub: "x".into(),
            exp: Utc::now().timestamp() - 5,
        };
        let token = sign(&claims, b"one").unwrap();
        assert!(verify::<Claims>(&token, b"one").is_none());
    }

    #[test]
    fn persist_secret_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        assert!(persist_secret(&blocker.join("secret"), "s3cret").is_err());

        let ok = dir.path().join("nested").join("secret");
        persist_secret(&ok, "s3cret").unwrap();
        assert_eq!(std::fs::read_to_string(ok).unwrap(), "s3cret");
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(verify::<Claims>("not.a.jwt", b"one").is_none());
    }
}
