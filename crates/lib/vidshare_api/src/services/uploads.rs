//! Multipart form handling: text fields plus file parts spooled to temp files.
//!
//! Spooled files are `NamedTempFile`s: they are deleted when the form is
//! dropped, i.e. once the request is done, whether or not the upload to the
//! media store succeeded.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// A file part written to local disk.
#[derive(Debug)]
pub struct SpooledFile {
    file: NamedTempFile,
}

impl SpooledFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Parsed multipart body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, SpooledFile>,
}

impl MultipartForm {
    /// Text field value, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Spooled file for `name`, if one was uploaded.
    pub fn file(&self, name: &str) -> Option<&SpooledFile> {
        self.files.get(name)
    }
}

/// Keep a short alphanumeric extension so media stores can infer the type.
fn safe_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Read every part of a multipart body. Parts with a file name are written
/// into `upload_dir`; empty file parts are ignored.
pub async fn read_multipart(mut multipart: Multipart, upload_dir: &Path) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await?;
                if file_name.is_empty() || bytes.is_empty() {
                    continue;
                }
                let suffix = safe_extension(&file_name)
                    .map(|ext| format!(".{ext}"))
                    .unwrap_or_default();
                let file = tempfile::Builder::new()
                    .prefix("upload-")
                    .suffix(&suffix)
                    .tempfile_in(upload_dir)?;
                tokio::fs::write(file.path(), &bytes).await?;
                debug!(field = %name, %file_name, bytes = bytes.len(), "spooled upload");
                form.files.insert(name, SpooledFile { file });
            }
            None => {
                let text = field.text().await?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}

/// Require a non-blank text field.
pub fn required_field<'a>(form: &'a MultipartForm, name: &str) -> AppResult<&'a str> {
    match form.field(name).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Validation("All fields are required".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(safe_extension("me.PNG").as_deref(), Some("png"));
        assert_eq!(safe_extension("noext"), None);
        assert_eq!(safe_extension("evil.p/ng"), None);
        assert_eq!(safe_extension("x.averyverylongext"), None);
    }
}
