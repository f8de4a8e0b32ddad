//! Track length reconciliation.

use crate::FallbackSynthesizer;
use narrata_core::{AudioClip, ImageAsset};
use std::sync::Arc;

/// Image and audio tracks of identical length, index-aligned by scene.
///
/// Only [`TrackBalancer::balance`] constructs this, so composition never
/// sees tracks of unequal length.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedTracks<V> {
    visuals: Vec<V>,
    audio: Vec<AudioClip>,
}

impl<V> BalancedTracks<V> {
    /// Number of scene slots.
    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    /// The visual track.
    pub fn visuals(&self) -> &[V] {
        &self.visuals
    }

    /// The audio track.
    pub fn audio(&self) -> &[AudioClip] {
        &self.audio
    }

    /// Both tracks.
    pub fn into_parts(self) -> (Vec<V>, Vec<AudioClip>) {
        (self.visuals, self.audio)
    }
}

/// Makes the visual and audio tracks the same length.
///
/// # Examples
///
/// ```
/// use narrata_core::ImageAsset;
/// use narrata_media::{FallbackConfig, FallbackSynthesizer, TrackBalancer};
/// use std::sync::Arc;
///
/// let fallback = Arc::new(FallbackSynthesizer::new(FallbackConfig::default()).unwrap());
/// let balancer = TrackBalancer::new(fallback.clone());
///
/// let images = vec![
///     ImageAsset::new(vec![1], "image/png"),
///     ImageAsset::new(vec![2], "image/png"),
/// ];
/// let audio = vec![fallback.silence_for(2.0)];
///
/// let (images, audio) = balancer.balance(images, audio).into_parts();
/// assert_eq!(images.len(), 2);
/// assert_eq!(audio[0], audio[1]);
/// ```
#[derive(Debug, Clone)]
pub struct TrackBalancer {
    fallback: Arc<FallbackSynthesizer>,
}

impl TrackBalancer {
    /// Balancer filling empty tracks from `fallback`.
    pub fn new(fallback: Arc<FallbackSynthesizer>) -> Self {
        Self { fallback }
    }

    /// Extends the shorter track by repeating its last element.
    ///
    /// An empty track is filled entirely with placeholders. Both outputs
    /// have length `max(images.len(), audio.len())`; equal-length inputs are
    /// returned unchanged.
    #[tracing::instrument(skip_all, fields(images = images.len(), audio = audio.len()))]
    pub fn balance<V>(&self, images: Vec<V>, audio: Vec<AudioClip>) -> BalancedTracks<V>
    where
        V: Clone + From<ImageAsset>,
    {
        let len = images.len().max(audio.len());
        if images.len() != audio.len() {
            tracing::debug!(target_len = len, "Balancing tracks of unequal length");
        }

        let visuals = extend_to(images, len, || V::from(self.fallback.image()));
        let audio = extend_to(audio, len, || self.fallback.default_silence());
        BalancedTracks { visuals, audio }
    }
}

fn extend_to<T: Clone>(mut track: Vec<T>, len: usize, placeholder: impl Fn() -> T) -> Vec<T> {
    match track.last().cloned() {
        Some(last) => track.resize(len.max(track.len()), last),
        None => track.extend((0..len).map(|_| placeholder())),
    }
    track
}
