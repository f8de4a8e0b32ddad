//! Quality checks over a run's generated media.

use serde::{Deserialize, Serialize};

/// Findings from checking a project's images, narration and final video.
///
/// Issues make the output invalid; warnings only lower the score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// No issues and a score at or above the configured minimum.
    pub is_valid: bool,
    /// Between 0 and 1.
    pub quality_score: f64,
    /// Defects in the output.
    pub issues: Vec<String>,
    /// Degradations worth knowing about.
    pub warnings: Vec<String>,
    /// Images inspected.
    pub images_checked: usize,
    /// Narration clips inspected.
    pub audio_checked: usize,
    /// Whether the final video was inspected.
    pub video_checked: bool,
}

impl ValidationReport {
    /// Human-readable summary.
    ///
    /// # Examples
    ///
    /// ```
    /// use narrata_core::ValidationReport;
    ///
    /// let report = ValidationReport {
    ///     is_valid: false,
    ///     quality_score: 0.4,
    ///     issues: vec!["Image 1 appears to be blank".to_string()],
    ///     ..ValidationReport::default()
    /// };
    /// let text = report.render();
    /// assert!(text.contains("FAILED"));
    /// assert!(text.contains("- Image 1 appears to be blank"));
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!(
            "Validation {} (score {:.2})\n",
            if self.is_valid { "PASSED" } else { "FAILED" },
            self.quality_score
        );
        if !self.issues.is_empty() {
            out.push_str("Issues:\n");
            for issue in &self.issues {
                out.push_str(&format!("  - {}\n", issue));
            }
        }
        if !self.warnings.is_empty() {
            out.push_str("Warnings:\n");
            for warning in &self.warnings {
                out.push_str(&format!("  - {}\n", warning));
            }
        }
        if self.issues.is_empty() && self.warnings.is_empty() {
            out.push_str("No findings\n");
        }
        out
    }
}
