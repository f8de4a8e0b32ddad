//! Content-addressable artifact storage for narrata.
//!
//! Finished videos (and any scene media a deployment chooses to keep) are
//! written once, addressed by the SHA-256 of their bytes, and read back by
//! the HTTP surface.
//!
//! # Example
//!
//! ```rust
//! use narrata_core::MediaKind;
//! use narrata_storage::{ArtifactMetadata, ArtifactStorage, FileSystemStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/narrata")?;
//! let metadata = ArtifactMetadata::new(MediaKind::Video, "video/mp4").with_duration(4.0);
//!
//! let reference = storage.store(b"not really an mp4", &metadata).await?;
//! let bytes = storage.retrieve(&reference).await?;
//! assert_eq!(bytes, b"not really an mp4");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;

pub use filesystem::FileSystemStorage;
pub use narrata_error::{StorageError, StorageErrorKind};

use narrata_core::{ArtifactRef, MediaKind};
use narrata_error::NarrataResult;

/// Pluggable artifact backends.
#[async_trait::async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Store bytes and return a reference to them.
    ///
    /// Storing identical bytes twice returns the same location.
    async fn store(&self, data: &[u8], metadata: &ArtifactMetadata) -> NarrataResult<ArtifactRef>;

    /// Read back stored bytes, verifying their hash.
    async fn retrieve(&self, reference: &ArtifactRef) -> NarrataResult<Vec<u8>>;

    /// Remove stored bytes.
    async fn delete(&self, reference: &ArtifactRef) -> NarrataResult<()>;

    /// Whether the referenced bytes are present.
    async fn exists(&self, reference: &ArtifactRef) -> NarrataResult<bool>;
}

/// What is being stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactMetadata {
    /// Media kind, which selects the subdirectory.
    pub kind: MediaKind,
    /// MIME type, which selects the file extension.
    pub mime_type: String,
    /// Declared duration, for time-based media.
    pub duration_seconds: f64,
    /// Whether the bytes are a degraded placeholder.
    pub placeholder: bool,
}

impl ArtifactMetadata {
    /// Metadata with zero duration.
    pub fn new(kind: MediaKind, mime_type: impl Into<String>) -> Self {
        Self {
            kind,
            mime_type: mime_type.into(),
            duration_seconds: 0.0,
            placeholder: false,
        }
    }

    /// Sets the declared duration.
    pub fn with_duration(mut self, duration_seconds: f64) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    /// Marks the artifact as a placeholder.
    pub fn with_placeholder(mut self, placeholder: bool) -> Self {
        self.placeholder = placeholder;
        self
    }
}
