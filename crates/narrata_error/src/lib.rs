//! Error types for narrata.
//!
//! Every crate in the workspace reports failures through these types.
//!
//! # Error Hierarchy
//!
//! - `*ErrorKind` enums name the specific condition
//! - `*Error` structs wrap a kind with the source location that created it
//! - [`NarrataError`] boxes any of them behind a single type
//!
//! # Examples
//!
//! ```
//! use narrata_error::{NarrataResult, PipelineError, PipelineErrorKind};
//!
//! fn lookup(id: &str) -> NarrataResult<()> {
//!     Err(PipelineError::new(PipelineErrorKind::ProjectNotFound(id.to_string())))?
//! }
//!
//! let err = lookup("missing").unwrap_err();
//! assert!(err.to_string().contains("missing"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod http;
mod media;
mod pipeline;
mod server;
mod storage;
mod synthesis;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{NarrataError, NarrataErrorKind, NarrataResult};
pub use http::{HttpError, JsonError};
pub use media::{MediaError, MediaErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use synthesis::{SynthesisError, SynthesisErrorKind};
