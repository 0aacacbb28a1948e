//! Filesystem-based object storage.

use nugu_error::{NotFoundError, NotFoundErrorKind, NuguResult, StorageError, StorageErrorKind};
use nugu_interface::{ObjectMetadata, ObjectStorage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use uuid::Uuid;

/// Sidecar written next to each object.
#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    filename: String,
    mime_type: String,
    channel_id: u64,
    user_id: u64,
    sha256: String,
    size_bytes: usize,
}

/// Filesystem storage backend.
///
/// Objects get a random 32-hex-digit key and are laid out as
/// `{base_path}/{key[0:2]}/{key[2:4]}/{key}` with a `{key}.json` sidecar
/// holding provenance and a SHA-256 checksum that is verified on read.
///
/// Keys are random rather than content hashes so deleting one object never
/// removes bytes another idol still uses.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> NuguResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    fn get_path(&self, key: &str) -> NuguResult<PathBuf> {
        if key.len() != 32 || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
            Err(StorageError::new(StorageErrorKind::InvalidKey(key.to_string())))?
        }
        Ok(self
            .base_path
            .join(&key[0..2])
            .join(&key[2..4])
            .join(key))
    }
}

#[async_trait::async_trait]
impl ObjectStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(size = data.len(), filename = %metadata.filename()))]
    async fn put(&self, data: &[u8], metadata: &ObjectMetadata) -> NuguResult<String> {
        let key = Uuid::new_v4().simple().to_string();
        let path = self.get_path(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let sidecar = Sidecar {
            filename: metadata.filename().clone(),
            mime_type: metadata.mime_type().clone(),
            channel_id: *metadata.channel_id(),
            user_id: *metadata.user_id(),
            sha256: Self::compute_hash(data),
            size_bytes: data.len(),
        };
        let sidecar_json = serde_json::to_vec_pretty(&sidecar).map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!("sidecar for {}: {}", key, e)))
        })?;
        tokio::fs::write(path.with_extension("json"), sidecar_json)
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Write(format!("{}: {}", key, e))))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(key = %key, size = data.len(), "Stored object");
        Ok(key)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> NuguResult<Vec<u8>> {
        let path = self.get_path(key)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NotFoundError::new(NotFoundErrorKind::Object(key.to_string())).into()
            } else {
                nugu_error::NuguError::from(StorageError::new(StorageErrorKind::Read(format!(
                    "{}: {}",
                    path.display(),
                    e
                ))))
            }
        })?;

        // A missing sidecar is tolerated for objects copied in by hand.
        if let Ok(raw) = tokio::fs::read(path.with_extension("json")).await {
            let sidecar: Sidecar = serde_json::from_slice(&raw).map_err(|e| {
                StorageError::new(StorageErrorKind::Read(format!("sidecar for {}: {}", key, e)))
            })?;
            let actual = Self::compute_hash(&data);
            if actual != sidecar.sha256 {
                Err(StorageError::new(StorageErrorKind::Read(format!(
                    "checksum mismatch for {}: expected {}, got {}",
                    key, sidecar.sha256, actual
                ))))?
            }
        }

        tracing::debug!(key = %key, size = data.len(), "Retrieved object");
        Ok(data)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> NuguResult<()> {
        let path = self.get_path(key)?;

        for target in [path.clone(), path.with_extension("json")] {
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %target.display(), "Object already absent");
                }
                Err(e) => Err(StorageError::new(StorageErrorKind::Delete(format!(
                    "{}: {}",
                    target.display(),
                    e
                ))))?,
            }
        }

        tracing::info!(key = %key, "Deleted object");
        Ok(())
    }
}
