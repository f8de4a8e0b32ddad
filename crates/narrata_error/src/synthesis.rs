//! Errors returned by media synthesis collaborators.

/// Why a single synthesis call failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SynthesisErrorKind {
    /// The call exceeded its time budget
    #[display("Synthesis timed out after {}s", _0)]
    Timeout(u64),
    /// The remote service reported an error
    #[display("Remote synthesis failed: {}", _0)]
    Remote(String),
    /// The service answered with something that is not usable media
    #[display("Invalid synthesis response: {}", _0)]
    InvalidResponse(String),
    /// The synthesis task panicked or was aborted
    #[display("Synthesis task panicked: {}", _0)]
    Panicked(String),
    /// No synthesizer is configured for this media kind
    #[display("Synthesizer unavailable: {}", _0)]
    Unavailable(String),
}

/// Synthesis error with location tracking.
///
/// # Examples
///
/// ```
/// use narrata_error::{SynthesisError, SynthesisErrorKind};
///
/// let err = SynthesisError::new(SynthesisErrorKind::Timeout(30));
/// assert!(err.is_retryable());
/// assert!(!SynthesisError::new(SynthesisErrorKind::Unavailable("video".into())).is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Synthesis Error: {} at line {} in {}", kind, line, file)]
pub struct SynthesisError {
    /// The kind of error that occurred
    pub kind: SynthesisErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SynthesisError {
    /// Create a new synthesis error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SynthesisErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            SynthesisErrorKind::Timeout(_)
                | SynthesisErrorKind::Remote(_)
                | SynthesisErrorKind::InvalidResponse(_)
        )
    }
}
