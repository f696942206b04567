use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/papervault/uploads")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys that could escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// The root directory disappearing or turning read-only affects every key.
    async fn ensure_root_available(&self) -> StorageResult<()> {
        match fs::metadata(&self.base_path).await {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => Ok(()),
            Ok(_) => Err(StorageError::Unavailable(format!(
                "storage root {} is not a writable directory",
                self.base_path.display()
            ))),
            Err(e) => Err(StorageError::Unavailable(format!(
                "storage root {} is not accessible: {}",
                self.base_path.display(),
                e
            ))),
        }
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => StorageError::Unavailable(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                )),
                _ => StorageError::IoError(e),
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_root_available().await?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // Written next to the target and renamed, so a reader never sees a partial file
        let tmp_path = path.with_extension(format!("{}.part", Uuid::new_v4().simple()));

        let write = async {
            let mut file = fs::File::create(&tmp_path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    tmp_path.display(),
                    e
                ))
            })?;

            file.write_all(&data).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    tmp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to sync file {}: {}",
                    tmp_path.display(),
                    e
                ))
            })?;

            fs::rename(&tmp_path, &path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move file into {}: {}",
                    path.display(),
                    e
                ))
            })
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&tmp_path).await;
            tracing::error!(
                error = %e,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Local storage upload failed"
            );
            return Err(e);
        }

        let url = self.public_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        let data = fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(storage_key.to_string()),
            _ => StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            )),
        })?;

        tracing::debug!(
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:4000/uploads/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_upload_download() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = Bytes::from_static(b"%PDF-1.4 test data");
        let url = storage
            .upload_with_key("papers/math/a.pdf", data.clone(), "application/pdf")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:4000/uploads/papers/math/a.pdf");
        assert!(storage.exists("papers/math/a.pdf").await.unwrap());
        assert_eq!(
            storage.download("papers/math/a.pdf").await.unwrap(),
            data.to_vec()
        );
    }

    #[tokio::test]
    async fn test_local_storage_overwrite_same_key() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .upload_with_key("papers/x/a.bin", Bytes::from_static(b"first"), "")
            .await
            .unwrap();
        storage
            .upload_with_key("papers/x/a.bin", Bytes::from_static(b"second"), "")
            .await
            .unwrap();

        assert_eq!(storage.download("papers/x/a.bin").await.unwrap(), b"second");
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("papers/x"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1, "no temporary files left behind");
    }

    #[tokio::test]
    async fn test_local_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .upload_with_key("papers/math/b.jpg", Bytes::from_static(b"jpg"), "image/jpeg")
            .await
            .unwrap();
        storage.delete("papers/math/b.jpg").await.unwrap();

        assert!(!storage.exists("papers/math/b.jpg").await.unwrap());
        // Deleting again is not an error
        storage.delete("papers/math/b.jpg").await.unwrap();
        assert!(matches!(
            storage.download("papers/math/b.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_storage_rejects_path_traversal() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .upload_with_key("../escape.txt", Bytes::from_static(b"x"), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.download("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_missing_root_is_unavailable() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        let storage = storage(&root).await;
        std::fs::remove_dir_all(&root).unwrap();

        let err = storage
            .upload_with_key("papers/math/c.pdf", Bytes::from_static(b"x"), "")
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
