//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, HttpError, JsonError, MediaError, PipelineError, ServerError,
    StorageError, SynthesisError,
};

/// Every error the workspace can produce.
///
/// # Examples
///
/// ```
/// use narrata_error::{NarrataError, MediaError, MediaErrorKind};
///
/// let err: NarrataError = MediaError::new(MediaErrorKind::Encode("exit 1".into())).into();
/// assert!(format!("{}", err).contains("Media Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum NarrataErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Media decode/encode error
    #[from(MediaError)]
    Media(MediaError),
    /// Collaborator synthesis error
    #[from(SynthesisError)]
    Synthesis(SynthesisError),
    /// Pipeline or batch error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Narrata error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Narrata Error: {}", _0)]
pub struct NarrataError(Box<NarrataErrorKind>);

impl NarrataError {
    /// Create a new error from a kind.
    pub fn new(kind: NarrataErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &NarrataErrorKind {
        &self.0
    }

    /// The pipeline error kind, if this is a pipeline error.
    pub fn pipeline_kind(&self) -> Option<&crate::PipelineErrorKind> {
        match self.kind() {
            NarrataErrorKind::Pipeline(e) => Some(&e.kind),
            _ => None,
        }
    }
}

impl<T> From<T> for NarrataError
where
    T: Into<NarrataErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for narrata operations.
pub type NarrataResult<T> = std::result::Result<T, NarrataError>;
