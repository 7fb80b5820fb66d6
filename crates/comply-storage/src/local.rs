//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use comply_core::error::{AppError, ErrorKind};
use comply_core::result::AppResult;
use comply_core::traits::storage::{ByteStream, StorageProvider};

/// Stores documents as plain files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a provider rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Map a relative storage path onto the root, rejecting escapes.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(AppError::validation(format!("Invalid storage path: {path}")));
        }
        Ok(self.root.join(relative))
    }

    fn not_found_or(e: std::io::Error, path: &str, action: &str) -> AppError {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::not_found("File not found.")
        } else {
            AppError::with_source(ErrorKind::Storage, format!("Failed to {action} file: {path}"), e)
        }
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| Self::not_found_or(e, path, "open"))?;
        Ok(Box::pin(ReaderStream::new(file).map(|chunk| chunk.map(Bytes::from))))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| Self::not_found_or(e, path, "read"))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write file: {path}"), e)
        })?;

        debug!(path, bytes = data.len(), "Stored document");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {path}"),
                e,
            )),
        }
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to stat file: {path}"), e)
        })
    }

    async fn size(&self, path: &str) -> AppResult<u64> {
        let full_path = self.resolve(path)?;
        fs::metadata(&full_path)
            .await
            .map(|m| m.len())
            .map_err(|e| Self::not_found_or(e, path, "stat"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("uploads");
        let provider = LocalStorageProvider::new(root.to_str().expect("utf8 path"))
            .await
            .expect("provider");
        (dir, provider)
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let (_dir, storage) = provider().await;
        storage
            .write("2026/BIR-001/UP-1.pdf", Bytes::from_static(b"%PDF-1.7"))
            .await
            .unwrap();

        assert!(storage.exists("2026/BIR-001/UP-1.pdf").await.unwrap());
        assert_eq!(storage.size("2026/BIR-001/UP-1.pdf").await.unwrap(), 8);
        assert_eq!(
            storage.read_bytes("2026/BIR-001/UP-1.pdf").await.unwrap(),
            Bytes::from_static(b"%PDF-1.7")
        );

        storage.delete("2026/BIR-001/UP-1.pdf").await.unwrap();
        assert!(!storage.exists("2026/BIR-001/UP-1.pdf").await.unwrap());
        storage.delete("2026/BIR-001/UP-1.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_dir, storage) = provider().await;
        let err = storage.read_bytes("nope.pdf").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "File not found.");
    }

    #[tokio::test]
    async fn test_rejects_parent_traversal() {
        let (_dir, storage) = provider().await;
        let err = storage
            .write("../escape.pdf", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
