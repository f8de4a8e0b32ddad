//! Collaborator seams for narrata.
//!
//! The pipeline never knows which model, service or binary produces its
//! scenes and media. It talks to these traits, and the facade wires
//! concrete implementations in at startup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{
    AudioSynthesizer, ImageSynthesizer, SceneSegmenter, TimelineEncoder, VideoSynthesizer,
};
