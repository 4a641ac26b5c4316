use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use uuid::Uuid;

use crate::errors::{AppError, Result};

pub const PUBLIC_PREFIX: &str = "/uploads";
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Local disk storage for uploaded images, served back under `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Checks size and content without touching the disk; returns the file extension.
    pub fn validate_image(&self, data: &Bytes) -> Result<&'static str> {
        if data.len() > self.max_bytes {
            return Err(AppError::FileTooLarge(self.max_bytes));
        }

        // trust the bytes, not the client's file name
        let extension = infer::get(data)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .map(|kind| kind.extension())
            .ok_or(AppError::InvalidImageFormat)?;
        if !ALLOWED_EXTENSIONS.contains(&extension) {
            return Err(AppError::InvalidImageFormat);
        }
        Ok(extension)
    }

    /// Writes already validated bytes under a random name and returns the public URL.
    pub async fn write_image(&self, data: &Bytes, extension: &str) -> Result<String> {
        self.ensure_root().await?;
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(self.root.join(&file_name), data).await?;

        tracing::info!(file = %file_name, bytes = data.len(), "image stored");
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    #[cfg(test)]
    pub async fn save_image(&self, data: &Bytes) -> Result<String> {
        let extension = self.validate_image(data)?;
        self.write_image(data, extension).await
    }

    /// Best-effort removal of files written earlier in a request that failed.
    pub async fn discard(&self, urls: &[String]) {
        for url in urls {
            let Some(file_name) = url.strip_prefix(PUBLIC_PREFIX).map(|n| n.trim_start_matches('/')) else {
                continue;
            };
            if let Some(path) = self.resolve(file_name).await {
                if let Err(e) = fs::remove_file(&path).await {
                    tracing::warn!(file = %file_name, error = %e, "failed to remove orphaned upload");
                }
            }
        }
    }

    /// Resolves a served file name; anything that is not a plain file name is rejected.
    pub async fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.is_empty()
            || file_name.starts_with('.')
            || sanitize_filename::sanitize(file_name) != file_name
            || Path::new(file_name).components().count() != 1
        {
            return None;
        }

        let path = self.root.join(file_name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }
}

pub fn content_type_for(path: &Path) -> mime::Mime {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
