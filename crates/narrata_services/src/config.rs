//! Endpoints of the collaborator services.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Where the remote collaborators live.
///
/// Any endpoint left unset makes the matching synthesis call fail fast,
/// so the pipeline substitutes placeholders for that media kind.
///
/// # Examples
///
/// ```
/// use narrata_services::ServicesConfig;
///
/// let config = ServicesConfig::default().with_image_url("http://localhost:9000/image");
/// assert_eq!(config.image_url().as_deref(), Some("http://localhost:9000/image"));
/// assert!(config.audio_url().is_none());
/// assert_eq!(*config.request_timeout_secs(), 60);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, setter(into))]
pub struct ServicesConfig {
    /// Base URL of the scene-splitting service.
    #[serde(default)]
    #[setters(strip_option, into)]
    segmenter_url: Option<String>,
    /// Image synthesis endpoint.
    #[serde(default)]
    #[setters(strip_option, into)]
    image_url: Option<String>,
    /// Narration synthesis endpoint.
    #[serde(default)]
    #[setters(strip_option, into)]
    audio_url: Option<String>,
    /// Image-to-video endpoint.
    #[serde(default)]
    #[setters(strip_option, into)]
    video_url: Option<String>,
    /// Per-request timeout enforced by the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            segmenter_url: None,
            image_url: None,
            audio_url: None,
            video_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServicesConfig {
    /// Creates a new builder.
    pub fn builder() -> ServicesConfigBuilder {
        ServicesConfigBuilder::default()
    }
}
