//! Shared harness for the API integration tests: an in-memory store, a
//! disk media store in a temp dir, and helpers to drive the router.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use tempfile::TempDir;
use tower::ServiceExt;
use vidshare_api::config::{ApiConfig, DEFAULT_MAX_BODY_BYTES};
use vidshare_api::{AppState, router};
use vidshare_core::auth::password::hash_password;
use vidshare_core::auth::{TokenService, TokenSettings};
use vidshare_core::media::{DiskMediaStore, MediaError, MediaStore, UploadedMedia};
use vidshare_core::models::auth::TokenPair;
use vidshare_core::models::user::{NewUser, PublicUser};
use vidshare_core::store::{MemoryStore, UserStore};

pub const ACCESS_SECRET: &str = "access-secret-for-tests";
pub const REFRESH_SECRET: &str = "refresh-secret-for-tests";
pub const MEDIA_BASE_URL: &str = "http://media.test";
pub const BOUNDARY: &str = "vidshare-test-boundary";

/// Media store that rejects every upload.
pub struct FailingMedia;

#[async_trait]
impl MediaStore for FailingMedia {
    async fn upload(&self, _path: &Path) -> Result<UploadedMedia, MediaError> {
        Err(MediaError::Rejected("upload refused".into()))
    }
}

/// Media store that accepts the first `n` uploads and rejects the rest.
pub struct FailAfter {
    remaining: AtomicUsize,
}

impl FailAfter {
    pub fn new(n: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(n),
        }
    }
}

#[async_trait]
impl MediaStore for FailAfter {
    async fn upload(&self, _path: &Path) -> Result<UploadedMedia, MediaError> {
        let left = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match left {
            Ok(_) => Ok(UploadedMedia {
                url: format!("{MEDIA_BASE_URL}/accepted.png"),
                public_id: Some("accepted".into()),
            }),
            Err(_) => Err(MediaError::Rejected("quota exceeded".into())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub media_dir: TempDir,
    _upload_dir: TempDir,
}

fn test_config(upload_dir: &Path) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "postgres://unused".into(),
        tokens: TokenSettings::new(ACCESS_SECRET, REFRESH_SECRET),
        cookie_secure: true,
        query_timeout: Duration::from_secs(5),
        upload_dir: upload_dir.to_path_buf(),
        media_dir: None,
        max_body_bytes: DEFAULT_MAX_BODY_BYTES,
    }
}

/// App backed by a disk media store.
pub fn spawn_app() -> TestApp {
    let media_dir = tempfile::tempdir().unwrap();
    let media = Arc::new(DiskMediaStore::new(media_dir.path(), MEDIA_BASE_URL));
    build(media, media_dir)
}

/// App whose media store fails every upload.
pub fn spawn_app_with_failing_media() -> TestApp {
    build(Arc::new(FailingMedia), tempfile::tempdir().unwrap())
}

/// App whose media store accepts `n` uploads, then fails.
pub fn spawn_app_with_media_failing_after(n: usize) -> TestApp {
    build(Arc::new(FailAfter::new(n)), tempfile::tempdir().unwrap())
}

fn build(media: Arc<dyn MediaStore>, media_dir: TempDir) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let config = test_config(upload_dir.path());
    let tokens = TokenService::new(store.clone(), config.tokens.clone()).unwrap();
    let state = AppState {
        store: store.clone(),
        tokens,
        media,
        config,
    };
    TestApp {
        router: router(state.clone()),
        state,
        store,
        media_dir,
        _upload_dir: upload_dir,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: serde_json::Value,
}

impl TestResponse {
    /// All `Set-Cookie` header values.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// The `Set-Cookie` value for `name`.
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.set_cookies()
            .into_iter()
            .find(|c| c.starts_with(&prefix))
    }

    pub fn message(&self) -> &str {
        self.json["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("parse JSON")
        };
        TestResponse {
            status,
            headers,
            json,
        }
    }

    /// Insert an identity directly into the store.
    pub async fn seed_user(&self, username: &str, password: &str) -> PublicUser {
        self.store
            .create_user(NewUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                fullname: format!("{username} fullname"),
                avatar: format!("{MEDIA_BASE_URL}/{username}.png"),
                cover_image: String::new(),
                password_hash: hash_password(password).unwrap(),
            })
            .await
            .unwrap()
    }

    /// Issue a token pair without going through `/login`.
    pub async fn tokens_for(&self, user: &PublicUser) -> TokenPair {
        self.state.tokens.issue_token_pair(user.id).await.unwrap()
    }
}

pub fn users_uri(path: &str) -> String {
    format!("/api/v1/users{path}")
}

pub fn json_request(method: &str, path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(users_uri(path))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_with_cookie(path: &str, access_token: &str) -> Request<Body> {
    Request::builder()
        .uri(users_uri(path))
        .header(header::COOKIE, format!("accessToken={access_token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_bearer(path: &str, access_token: &str) -> Request<Body> {
    Request::builder()
        .uri(users_uri(path))
        .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap()
}

/// A multipart part: text field or file.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(
    method: &str,
    path: &str,
    access_token: Option<&str>,
    parts: &[Part<'_>],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(users_uri(path))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = access_token {
        builder = builder.header(header::COOKIE, format!("accessToken={token}"));
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}
