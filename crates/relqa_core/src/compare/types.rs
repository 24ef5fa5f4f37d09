//! Report types for group comparisons.

use std::fmt;
use std::path::PathBuf;

use crate::audio::DecodeError;

/// Errors inside one sub-comparison. Never escapes the executor: each one
/// becomes a `Failed` report.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to write spectrogram: {0}")]
    Artifact(#[from] image::ImageError),
}

/// Result type for comparison steps.
pub type CompareResult<T> = Result<T, CompareError>;

/// What a sub-comparison looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// One audio track index.
    Audio(usize),
    Menu,
    Structure,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Audio(track) => write!(f, "audio track {}", track),
            Category::Menu => write!(f, "menu"),
            Category::Structure => write!(f, "structure"),
        }
    }
}

/// Verdict of a sub-comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Same,
    Different,
    Failed(String),
    Skipped(String),
}

/// Result of one sub-comparison between two sides of a group.
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub category: Category,
    pub source_tag: String,
    pub reference_tag: String,
    pub outcome: Outcome,
    /// Measurements worth showing next to the verdict.
    pub details: Vec<String>,
    /// Non-fatal issues such as length mismatches.
    pub warnings: Vec<String>,
    /// Spectrogram written for a flagged residual.
    pub artifact: Option<PathBuf>,
    /// Tool output behind a failure, beyond the first line.
    pub tool_output: Vec<String>,
}

impl CategoryReport {
    pub fn new(
        category: Category,
        source_tag: impl Into<String>,
        reference_tag: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            category,
            source_tag: source_tag.into(),
            reference_tag: reference_tag.into(),
            outcome,
            details: Vec::new(),
            warnings: Vec::new(),
            artifact: None,
            tool_output: Vec::new(),
        }
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let verdict = match &self.outcome {
            Outcome::Same => "same".to_string(),
            Outcome::Different => "different".to_string(),
            Outcome::Failed(reason) => format!("failed: {}", reason),
            Outcome::Skipped(reason) => format!("skipped: {}", reason),
        };
        let mut line = format!(
            "{} vs {} {}: {}",
            self.source_tag, self.reference_tag, self.category, verdict
        );
        if !self.details.is_empty() {
            line.push_str(&format!(" ({})", self.details.join(", ")));
        }
        line
    }
}

/// All reports for one group.
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group_id: String,
    pub reports: Vec<CategoryReport>,
    /// Set when the group was not compared at all.
    pub skipped: Option<String>,
}

impl GroupReport {
    pub fn has_difference(&self) -> bool {
        self.reports.iter().any(|r| r.outcome == Outcome::Different)
    }

    pub fn has_failure(&self) -> bool {
        self.reports
            .iter()
            .any(|r| matches!(r.outcome, Outcome::Failed(_)))
    }

    /// Reports for one category, across every side pairing.
    pub fn category(&self, category: Category) -> impl Iterator<Item = &CategoryReport> {
        self.reports.iter().filter(move |r| r.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_includes_details() {
        let mut report = CategoryReport::new(Category::Audio(0), "1", "2", Outcome::Different);
        report.details.push("mean |diff| 3.2".to_string());
        assert_eq!(report.summary(), "1 vs 2 audio track 0: different (mean |diff| 3.2)");
    }

    #[test]
    fn group_flags_follow_reports() {
        let group = GroupReport {
            group_id: "001".to_string(),
            reports: vec![
                CategoryReport::new(Category::Menu, "1", "2", Outcome::Same),
                CategoryReport::new(Category::Audio(0), "1", "2", Outcome::Failed("x".into())),
            ],
            skipped: None,
        };
        assert!(!group.has_difference());
        assert!(group.has_failure());
        assert_eq!(group.category(Category::Menu).count(), 1);
    }
}
