//! Collaborator adapters for narrata.
//!
//! - [`ParagraphSegmenter`] splits text into scenes with simple rules
//! - [`RemoteSegmenter`] asks a scene-splitting service
//! - [`RemoteSynthesizer`] calls image, narration and image-to-video endpoints

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod paragraph;
mod remote;

pub use config::{ServicesConfig, ServicesConfigBuilder};
pub use paragraph::ParagraphSegmenter;
pub use remote::{Characters, RemoteScene, RemoteSegmenter, RemoteSynthesizer, SynthesisRequest, json_payload};
