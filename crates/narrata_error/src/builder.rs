//! Errors from assembling core values with their builders.

/// Why a value could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BuilderErrorKind {
    /// A field without a default was never set
    #[display("{} was not set", _0)]
    MissingField(String),
    /// A field that identifies the value is empty or whitespace
    #[display("{} must not be blank", _0)]
    BlankField(&'static str),
}

/// A value that failed to build, with the location of the build call.
///
/// # Examples
///
/// ```
/// use narrata_error::{BuilderError, BuilderErrorKind};
///
/// let err = BuilderError::new(BuilderErrorKind::BlankField("scene id"));
/// assert_eq!(err.kind, BuilderErrorKind::BlankField("scene id"));
/// assert!(err.to_string().contains("scene id must not be blank"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: {} at line {} in {}", kind, line, file)]
pub struct BuilderError {
    /// What was wrong
    pub kind: BuilderErrorKind,
    /// Line of the build call
    pub line: u32,
    /// File of the build call
    pub file: &'static str,
}

impl BuilderError {
    /// Wraps `kind` with the caller's location.
    #[track_caller]
    pub fn new(kind: BuilderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
