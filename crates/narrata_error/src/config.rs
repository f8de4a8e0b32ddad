//! Configuration error types.

/// Configuration could not be read, merged or deserialized.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use narrata_error::ConfigError;
    ///
    /// let err = ConfigError::new("pipeline.worker_pool_size must be positive");
    /// assert!(err.message.contains("worker_pool_size"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
