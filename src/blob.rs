//! Storage for uploaded document files

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "png", "jpg", "jpeg", "gif", "zip",
    "rar",
];

/// A stored upload and the URL it is served from
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredBlob {
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub url: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` uploaded under `original_name`
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<StoredBlob>;
}

/// Blob store backed by a local directory served under `/uploads`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<StoredBlob> {
        if bytes.is_empty() {
            return Err(AppError::Validation("No file uploaded".to_string()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::Validation(
                "File too large. Maximum size is 50MB".to_string(),
            ));
        }

        let ext = allowed_extension(original_name)?;
        let filename = stored_name(&ext);

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        tracing::info!(
            %filename,
            original_name,
            size = bytes.len(),
            "Stored upload"
        );

        Ok(StoredBlob {
            url: format!("/uploads/{}", filename),
            filename,
            original_name: original_name.to_string(),
            size: bytes.len(),
        })
    }
}

/// Lowercased extension of `name` if it is on the allowlist
fn allowed_extension(name: &str) -> Result<String> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "File type not allowed. Allowed types: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}

fn stored_name(ext: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &id[..8],
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("uploads"));

        let blob = store.put("Thesis.PDF", b"%PDF-1.4").await.unwrap();
        assert!(blob.filename.ends_with(".pdf"));
        assert_eq!(blob.url, format!("/uploads/{}", blob.filename));
        assert_eq!(blob.original_name, "Thesis.PDF");
        assert_eq!(blob.size, 8);

        let written = tokio::fs::read(store.root().join(&blob.filename)).await.unwrap();
        assert_eq!(written, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_put_rejects_disallowed_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let result = store.put("script.sh", b"echo hi").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = store.put("noext", b"data").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = store.put("empty.txt", b"").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_put_rejects_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let bytes = vec![0u8; MAX_UPLOAD_BYTES + 1];

        let result = store.put("big.zip", &bytes).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_stored_name_shape() {
        let name = stored_name("png");
        // YYYYmmdd_HHMMSS_xxxxxxxx.png
        assert_eq!(name.len(), 15 + 1 + 8 + 4);
        assert!(name.ends_with(".png"));
    }
}
