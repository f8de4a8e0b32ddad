//! The result of a single synthesis call.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Either synthesized media or the reason it could not be produced.
///
/// Synthesis collaborators never raise past the supervisor; every call
/// ends up as one of these variants.
///
/// # Examples
///
/// ```
/// use narrata_core::GenerationOutcome;
///
/// let ok = GenerationOutcome::success_with_duration(vec![1u8, 2, 3], 2.5);
/// assert!(ok.is_success());
/// assert_eq!(ok.duration_seconds(), Some(2.5));
///
/// let failed: GenerationOutcome<Vec<u8>> = GenerationOutcome::failure("model offline");
/// assert_eq!(failed.reason(), Some("model offline"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome<T> {
    /// The collaborator produced media.
    Success {
        /// The media produced.
        payload: T,
        /// Duration reported alongside the payload, if any.
        duration_seconds: Option<f64>,
    },
    /// The collaborator failed or timed out.
    Failure {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl<T> GenerationOutcome<T> {
    /// A success without a known duration.
    pub fn success(payload: T) -> Self {
        Self::Success {
            payload,
            duration_seconds: None,
        }
    }

    /// A success with a reported duration.
    pub fn success_with_duration(payload: T, duration_seconds: f64) -> Self {
        Self::Success {
            payload,
            duration_seconds: Some(duration_seconds),
        }
    }

    /// A failure carrying the given reason.
    pub fn failure(reason: impl Display) -> Self {
        Self::Failure {
            reason: reason.to_string(),
        }
    }

    /// Converts a collaborator result into an outcome.
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::failure(e),
        }
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure reason, if the call failed.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }

    /// The reported duration, if the call succeeded with one.
    pub fn duration_seconds(&self) -> Option<f64> {
        match self {
            Self::Success {
                duration_seconds, ..
            } => *duration_seconds,
            Self::Failure { .. } => None,
        }
    }

    /// Transforms the payload, keeping duration and failure untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GenerationOutcome<U> {
        match self {
            Self::Success {
                payload,
                duration_seconds,
            } => GenerationOutcome::Success {
                payload: f(payload),
                duration_seconds,
            },
            Self::Failure { reason } => GenerationOutcome::Failure { reason },
        }
    }

    /// Resolves the outcome into a payload, substituting on failure.
    ///
    /// The substitute receives the failure reason.
    pub fn unwrap_or_else(self, substitute: impl FnOnce(&str) -> T) -> T {
        match self {
            Self::Success { payload, .. } => payload,
            Self::Failure { reason } => substitute(&reason),
        }
    }
}
