//! Scene descriptors produced by segmentation.

use derive_getters::Getters;
use narrata_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};

/// One narrative unit with derived visual and narration metadata.
///
/// Scenes are immutable once segmentation produces them. Downstream stages
/// share them behind an `Arc` rather than cloning.
///
/// # Examples
///
/// ```
/// use narrata_core::Scene;
///
/// let scene = Scene::builder()
///     .id("scene_1")
///     .order(0usize)
///     .text("The storm broke over the harbour.")
///     .action_level(1.7f32)
///     .build()
///     .unwrap();
///
/// assert_eq!(*scene.action_level(), 1.0);
/// assert!(scene.characters().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct Scene {
    /// Stable identifier within the project.
    id: String,
    /// Position in the narrative; scenes are processed in ascending order.
    order: usize,
    /// Narration text.
    text: String,
    /// Characters appearing in the scene.
    #[builder(default)]
    #[serde(default)]
    characters: Vec<String>,
    /// Where the scene takes place.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    setting: Option<String>,
    /// Emotional tone.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    mood: Option<String>,
    /// Action intensity in `[0, 1]`.
    #[builder(default)]
    #[serde(default)]
    action_level: f32,
}

impl Scene {
    /// Creates a new scene builder.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// A bare scene with only text.
    pub fn new(id: impl Into<String>, order: usize, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order,
            text: text.into(),
            characters: Vec::new(),
            setting: None,
            mood: None,
            action_level: 0.0,
        }
    }

    /// Number of characters of narration, the basis for fallback silence length.
    pub fn narration_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns a copy with `action_level` forced into `[0, 1]`.
    pub fn normalized(mut self) -> Self {
        self.action_level = clamp_unit(self.action_level);
        self
    }
}

impl SceneBuilder {
    /// Build the scene, clamping the action level into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id`, `order` or `text` is missing, or `id` is blank.
    pub fn build(&self) -> Result<Scene, BuilderError> {
        let scene = self
            .build_internal()
            .map_err(|e| BuilderError::new(BuilderErrorKind::MissingField(e.to_string())))?;
        if scene.id.trim().is_empty() {
            return Err(BuilderError::new(BuilderErrorKind::BlankField("scene id")));
        }
        Ok(scene.normalized())
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
