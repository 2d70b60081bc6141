//! Media upload collaborator.
//!
//! Uploaded files arrive as local paths (spooled by the API layer) and come
//! back as public URLs. Any failure here is fatal to the write that needed
//! the upload.

pub mod cloudinary;
pub mod disk;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use disk::DiskMediaStore;

/// Media upload errors.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    /// Public retrieval URL.
    pub url: String,
    /// Provider-side identifier, when the provider has one.
    pub public_id: Option<String>,
}

/// Stores a local file and returns where it can be fetched from.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError>;
}

/// Best-effort MIME type from the file extension.
pub(crate) fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn guess_mime_by_extension() {
        assert_eq!(guess_mime(&PathBuf::from("a/b.PNG")), "image/png");
        assert_eq!(guess_mime(&PathBuf::from("clip.mp4")), "video/mp4");
        assert_eq!(guess_mime(&PathBuf::from("noext")), "application/octet-stream");
    }
}
