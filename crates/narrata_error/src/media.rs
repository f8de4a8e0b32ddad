//! Media decoding and encoding errors.

/// Specific media error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MediaErrorKind {
    /// Audio or image bytes could not be decoded
    #[display("Failed to decode media: {}", _0)]
    Decode(String),
    /// The encoder process ran but produced no usable output
    #[display("Encoding failed: {}", _0)]
    Encode(String),
    /// The encoder binary could not be located
    #[display("Encoder unavailable: {}", _0)]
    EncoderUnavailable(String),
    /// Scratch files could not be written or read
    #[display("Media I/O failed: {}", _0)]
    Io(String),
    /// A placeholder asset could not be rendered
    #[display("Failed to render placeholder: {}", _0)]
    Placeholder(String),
}

/// Media error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The kind of error that occurred
    pub kind: MediaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MediaError {
    /// Create a new media error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
