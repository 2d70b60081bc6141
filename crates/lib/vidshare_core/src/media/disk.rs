//! Local-directory media store for development and tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{MediaError, MediaStore, UploadedMedia};

/// Copies uploads into a directory and serves them under `base_url`.
#[derive(Clone, Debug)]
pub struct DiskMediaStore {
    dir: PathBuf,
    base_url: String,
}

impl DiskMediaStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let id = Uuid::new_v4().simple().to_string();
        let name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.clone(),
        };
        tokio::fs::copy(path, self.dir.join(&name)).await?;
        debug!(file = %name, "stored media on disk");
        Ok(UploadedMedia {
            url: format!("{}/{name}", self.base_url),
            public_id: Some(id),
        })
    }
}
