//! Cloudinary upload client.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{MediaError, MediaStore, UploadedMedia, guess_mime};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Cloudinary account credentials.
#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// API base URL, overridable for testing.
    pub api_base: String,
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Read `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and
    /// `CLOUDINARY_API_SECRET`. Returns `None` unless all three are set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self::new(
            var("CLOUDINARY_CLOUD_NAME")?,
            var("CLOUDINARY_API_KEY")?,
            var("CLOUDINARY_API_SECRET")?,
        ))
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/auto/upload", self.api_base, self.cloud_name)
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Signs upload parameters: SHA-256 over the sorted `key=value` pairs joined
/// by `&`, followed by the API secret.
pub(crate) fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Uploads files to Cloudinary as signed data-URI uploads.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    pub fn new(client: Client, config: CloudinaryConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError> {
        let bytes = tokio::fs::read(path).await?;
        let data_uri = format!("data:{};base64,{}", guess_mime(path), STANDARD.encode(&bytes));
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(&[("timestamp", timestamp.as_str())], &self.config.api_secret);

        let form = [
            ("file", data_uri.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let resp = self
            .client
            .post(self.config.upload_url())
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            warn!(%status, %message, "cloudinary rejected upload");
            return Err(MediaError::Rejected(message));
        }

        let body: UploadResponse = resp.json().await?;
        let url = body
            .secure_url
            .ok_or_else(|| MediaError::InvalidResponse("missing secure_url".into()))?;
        debug!(%url, bytes = bytes.len(), "uploaded media to cloudinary");
        Ok(UploadedMedia {
            url,
            public_id: body.public_id,
        })
    }
}
