//! SRT generation for the optional subtitle pass.

use std::fmt::Write;

const LINE_WIDTH: usize = 42;

/// One subtitle on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Text shown.
    pub text: String,
}

/// Renders cues as SRT, skipping empty text.
///
/// # Examples
///
/// ```
/// use narrata_media::{SubtitleCue, to_srt};
///
/// let srt = to_srt(&[SubtitleCue {
///     start_seconds: 0.0,
///     end_seconds: 3.0,
///     text: "The storm broke.".into(),
/// }]);
/// assert_eq!(srt, "1\n00:00:00,000 --> 00:00:03,000\nThe storm broke.\n\n");
/// ```
pub fn to_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    let mut number = 0;
    for cue in cues.iter().filter(|c| !c.text.trim().is_empty()) {
        number += 1;
        let _ = writeln!(out, "{}", number);
        let _ = writeln!(
            out,
            "{} --> {}",
            timestamp(cue.start_seconds),
            timestamp(cue.end_seconds)
        );
        for line in wrap(cue.text.trim(), LINE_WIDTH) {
            let _ = writeln!(out, "{}", line);
        }
        out.push('\n');
    }
    out
}

fn timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let (hours, rest) = (total_ms / 3_600_000, total_ms % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    let (secs, millis) = (rest / 1000, rest % 1000);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
