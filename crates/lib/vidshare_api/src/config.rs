//! API server configuration.

use std::path::PathBuf;
use std::time::Duration;

use vidshare_core::auth::TokenSettings;
use vidshare_core::auth::jwt::resolve_secret;
use vidshare_core::auth::tokens::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};
use vidshare_core::channel::DEFAULT_QUERY_TIMEOUT;

/// Default cap on request bodies (multipart uploads included): 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Token secrets and lifetimes.
    pub tokens: TokenSettings,
    /// Set the `Secure` attribute on auth cookies. Off only for plain-HTTP
    /// local development.
    pub cookie_secure: bool,
    /// Upper bound for channel/history queries.
    pub query_timeout: Duration,
    /// Directory multipart uploads are spooled into before hand-off.
    pub upload_dir: PathBuf,
    /// When set, `/media` serves this directory (disk media store).
    pub media_dir: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                    | Default                                   |
    /// |-----------------------------|-------------------------------------------|
    /// | `BIND_ADDR`                 | `127.0.0.1:8000`                          |
    /// | `DATABASE_URL`              | `postgres://localhost:5432/vidshare`      |
    /// | `ACCESS_TOKEN_SECRET`       | generated & persisted to file             |
    /// | `REFRESH_TOKEN_SECRET`      | generated & persisted to file             |
    /// | `ACCESS_TOKEN_EXPIRY_SECS`  | `86400`                                   |
    /// | `REFRESH_TOKEN_EXPIRY_SECS` | `604800`                                  |
    /// | `COOKIE_SECURE`             | `true`                                    |
    /// | `QUERY_TIMEOUT_SECS`        | `10`                                      |
    /// | `UPLOAD_DIR`                | system temp dir                           |
    pub fn from_env() -> Self {
        let tokens = TokenSettings {
            access_ttl_secs: env_parse("ACCESS_TOKEN_EXPIRY_SECS", DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl_secs: env_parse("REFRESH_TOKEN_EXPIRY_SECS", DEFAULT_REFRESH_TTL_SECS),
            ..TokenSettings::new(
                resolve_secret("ACCESS_TOKEN_SECRET", "access-token-secret"),
                resolve_secret("REFRESH_TOKEN_SECRET", "refresh-token-secret"),
            )
        };
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/vidshare".into()),
            tokens,
            cookie_secure: env_parse("COOKIE_SECURE", true),
            query_timeout: Duration::from_secs(env_parse(
                "QUERY_TIMEOUT_SECS",
                DEFAULT_QUERY_TIMEOUT.as_secs(),
            )),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            media_dir: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
