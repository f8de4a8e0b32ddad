//! Rule-based scene segmentation.

use async_trait::async_trait;
use narrata_core::Scene;
use narrata_error::{ConfigError, NarrataResult};
use narrata_interface::SceneSegmenter;
use regex::Regex;
use std::collections::HashMap;

/// Capitalised words that start sentences far more often than they name anyone.
const COMMON_WORDS: &[&str] = &[
    "A", "An", "And", "As", "At", "But", "For", "He", "Her", "His", "I", "If", "In", "It", "Its",
    "My", "No", "Not", "Of", "On", "Once", "One", "Or", "She", "So", "That", "The", "Their",
    "Then", "There", "They", "This", "To", "We", "What", "When", "Where", "While", "With", "You",
];

const MOODS: &[(&str, &[&str])] = &[
    ("tense", &["dark", "fear", "scream", "blood", "shadow", "storm", "afraid"]),
    ("joyful", &["laugh", "smile", "happy", "joy", "bright", "celebrat"]),
    ("melancholic", &["tear", "cry", "alone", "lost", "grief", "sorrow"]),
    ("calm", &["quiet", "calm", "still", "gentle", "soft", "peace"]),
];

/// Splits text on blank lines, one scene per paragraph.
///
/// A single long paragraph is broken into groups of sentences instead.
/// Characters are capitalised words that recur across the whole text;
/// action level grows with exclamation and question density.
///
/// # Examples
///
/// ```
/// use narrata_interface::SceneSegmenter;
/// use narrata_services::ParagraphSegmenter;
///
/// # tokio_test::block_on(async {
/// let segmenter = ParagraphSegmenter::new().unwrap();
/// let scenes = segmenter
///     .segment("Mara ran to the harbour!\n\nMara waited in the rain.")
///     .await
///     .unwrap();
///
/// assert_eq!(scenes.len(), 2);
/// assert_eq!(scenes[0].characters(), &vec!["Mara".to_string()]);
/// assert!(*scenes[0].action_level() > *scenes[1].action_level());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ParagraphSegmenter {
    sentences_per_scene: usize,
    paragraph_break: Regex,
    sentence_end: Regex,
    capitalised: Regex,
    place: Regex,
}

impl ParagraphSegmenter {
    /// Segmenter grouping three sentences per scene for unbroken text.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in pattern fails to compile.
    pub fn new() -> NarrataResult<Self> {
        Ok(Self {
            sentences_per_scene: 3,
            paragraph_break: compile(r"\n\s*\n")?,
            sentence_end: compile(r"[.!?]+[\s]+")?,
            capitalised: compile(r"\b[A-Z][a-z]+\b")?,
            place: compile(r"\b(?:in|at|on|inside|near|across) (the [a-z]+(?: [a-z]+)?)")?,
        })
    }

    /// Sets how many sentences form a scene when text has no paragraph breaks.
    pub fn with_sentences_per_scene(mut self, count: usize) -> Self {
        self.sentences_per_scene = count.max(1);
        self
    }

    fn paragraphs(&self, text: &str) -> Vec<String> {
        let paragraphs: Vec<String> = self
            .paragraph_break
            .split(text)
            .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|p| !p.is_empty())
            .collect();

        if paragraphs.len() != 1 {
            return paragraphs;
        }

        let sentences = self.sentences(&paragraphs[0]);
        if sentences.len() <= self.sentences_per_scene + 1 {
            return paragraphs;
        }
        sentences
            .chunks(self.sentences_per_scene)
            .map(|group| group.join(" "))
            .collect()
    }

    fn sentences(&self, paragraph: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for found in self.sentence_end.find_iter(paragraph) {
            sentences.push(paragraph[start..found.end()].trim().to_string());
            start = found.end();
        }
        let rest = paragraph[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
        sentences
    }

    /// Capitalised words seen at least twice, in order of first appearance.
    fn recurring_names(&self, text: &str) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for word in self.capitalised.find_iter(text).map(|m| m.as_str()) {
            if COMMON_WORDS.contains(&word) {
                continue;
            }
            let count = counts.entry(word).or_insert(0);
            if *count == 0 {
                order.push(word);
            }
            *count += 1;
        }
        order
            .into_iter()
            .filter(|w| counts.get(w).copied().unwrap_or(0) >= 2)
            .map(str::to_string)
            .collect()
    }

    fn scene(&self, index: usize, text: String, names: &[String]) -> NarrataResult<Scene> {
        let characters: Vec<String> = names
            .iter()
            .filter(|name| {
                self.capitalised
                    .find_iter(&text)
                    .any(|m| m.as_str() == name.as_str())
            })
            .cloned()
            .collect();

        let mut builder = Scene::builder();
        builder
            .id(format!("scene_{}", index + 1))
            .order(index)
            .characters(characters)
            .action_level(action_level(&text, self.sentences(&text).len()));
        if let Some(place) = self.place.captures(&text).and_then(|c| c.get(1)) {
            builder.setting(place.as_str());
        }
        if let Some(mood) = mood(&text) {
            builder.mood(mood);
        }
        Ok(builder.text(text).build()?)
    }
}

#[async_trait]
impl SceneSegmenter for ParagraphSegmenter {
    #[tracing::instrument(skip_all, fields(chars = text.len()))]
    async fn segment(&self, text: &str) -> NarrataResult<Vec<Scene>> {
        let mut paragraphs = self.paragraphs(text);
        if paragraphs.is_empty() {
            tracing::debug!("No paragraphs found, using whole text as one scene");
            paragraphs.push(text.trim().to_string());
        }

        let names = self.recurring_names(text);
        let scenes = paragraphs
            .into_iter()
            .enumerate()
            .map(|(i, p)| self.scene(i, p, &names))
            .collect::<NarrataResult<Vec<_>>>()?;

        tracing::debug!(scenes = scenes.len(), characters = names.len(), "Segmented text");
        Ok(scenes)
    }

    fn name(&self) -> &str {
        "paragraph"
    }
}

fn compile(pattern: &str) -> NarrataResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::new(format!("Invalid segmentation pattern '{}': {}", pattern, e)).into())
}

fn action_level(text: &str, sentences: usize) -> f32 {
    let exclamations = text.matches('!').count() as f32;
    let questions = text.matches('?').count() as f32;
    ((exclamations + 0.5 * questions) / sentences.max(1) as f32).min(1.0)
}

fn mood(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    MOODS
        .iter()
        .map(|(mood, cues)| (*mood, cues.iter().filter(|cue| lower.contains(**cue)).count()))
        .filter(|(_, hits)| *hits > 0)
        .max_by_key(|(_, hits)| *hits)
        .map(|(mood, _)| mood)
}
