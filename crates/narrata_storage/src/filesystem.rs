//! Filesystem-based artifact storage.

use crate::{ArtifactMetadata, ArtifactStorage};
use narrata_core::{ArtifactRef, MediaKind};
use narrata_error::{NarrataResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Stores artifacts as `{base}/{kind}/{hash[0:2]}/{hash}.{ext}`.
///
/// Writes go to a temporary sibling first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Opens storage rooted at `base_path`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> NarrataResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened artifact storage");
        Ok(Self { base_path })
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    fn path_for(&self, hash: &str, metadata: &ArtifactMetadata) -> PathBuf {
        let kind_dir = match metadata.kind {
            MediaKind::Image => "images",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        };
        self.base_path
            .join(kind_dir)
            .join(&hash[0..2])
            .join(format!("{}.{}", hash, extension_for(&metadata.mime_type)))
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mpeg" => "mp3",
        _ => "bin",
    }
}

#[async_trait::async_trait]
impl ArtifactStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(size = data.len(), kind = %metadata.kind))]
    async fn store(&self, data: &[u8], metadata: &ArtifactMetadata) -> NarrataResult<ArtifactRef> {
        let hash = Self::compute_hash(data);
        let path = self.path_for(&hash, metadata);
        let reference = ArtifactRef {
            content_hash: hash.clone(),
            storage_path: path.to_string_lossy().to_string(),
            size_bytes: data.len() as u64,
            mime_type: metadata.mime_type.clone(),
            duration_seconds: metadata.duration_seconds,
            placeholder: metadata.placeholder,
        };

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(hash = %hash, "Artifact already stored");
            return Ok(reference);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(hash = %hash, path = %path.display(), "Stored artifact");
        Ok(reference)
    }

    #[tracing::instrument(skip(self, reference), fields(hash = %reference.content_hash))]
    async fn retrieve(&self, reference: &ArtifactRef) -> NarrataResult<Vec<u8>> {
        let path = Path::new(&reference.storage_path);
        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let actual = Self::compute_hash(&data);
        if actual != reference.content_hash {
            return Err(StorageError::new(StorageErrorKind::HashMismatch(format!(
                "expected {}, got {}",
                reference.content_hash, actual
            )))
            .into());
        }
        Ok(data)
    }

    #[tracing::instrument(skip(self, reference), fields(hash = %reference.content_hash))]
    async fn delete(&self, reference: &ArtifactRef) -> NarrataResult<()> {
        tokio::fs::remove_file(&reference.storage_path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
                } else {
                    StorageError::new(StorageErrorKind::FileWrite(format!(
                        "delete {}: {}",
                        reference.storage_path, e
                    )))
                }
            })?;
        tracing::info!("Deleted artifact");
        Ok(())
    }

    async fn exists(&self, reference: &ArtifactRef) -> NarrataResult<bool> {
        Ok(tokio::fs::try_exists(&reference.storage_path)
            .await
            .unwrap_or(false))
    }
}
