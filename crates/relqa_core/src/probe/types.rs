//! Types for descriptor probing.

use std::path::{Path, PathBuf};

use crate::models::{MediaItem, TrackLayout};
use crate::tools::ToolError;

/// Error type for probe operations.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The probing tool failed or timed out.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Tool output was not valid JSON.
    #[error("Failed to parse ffprobe output: {0}")]
    Json(#[from] serde_json::Error),

    /// Tool output was structurally unexpected.
    #[error("Unexpected {tool} output: {message}")]
    Parse { tool: String, message: String },

    /// Chapter XML could not be read.
    #[error("Malformed chapter XML: {0}")]
    ChapterXml(String),
}

/// Type alias for probe results.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Raw facts reported by a prober for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Container format name as reported by the tool.
    pub container: String,
    /// Duration in milliseconds (0 = unknown).
    pub duration_ms: u64,
    /// Track composition.
    pub tracks: TrackLayout,
    /// Chapter marks in milliseconds, one list per chapter track.
    pub chapters: Vec<Vec<u64>>,
    /// Sample rate of the first audio track.
    pub audio_sample_rate: Option<u32>,
}

impl ProbeReport {
    /// Whether the container is Matroska/WebM.
    pub fn is_matroska(&self) -> bool {
        self.container.split(',').any(|f| f == "matroska" || f == "webm")
    }

    /// Build the descriptor for `path` from this report.
    pub fn into_item(self, path: &Path) -> MediaItem {
        let mut item = MediaItem::new(path)
            .with_duration_ms(self.duration_ms)
            .with_tracks(self.tracks)
            .with_chapters(self.chapters);
        item.audio_sample_rate = self.audio_sample_rate;
        item
    }
}

/// Sort marks and drop duplicates so the track is strictly increasing.
pub fn normalize_marks(mut marks: Vec<u64>) -> Vec<u64> {
    marks.sort_unstable();
    marks.dedup();
    marks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_and_dedups() {
        assert_eq!(normalize_marks(vec![5000, 0, 5000, 1000]), vec![0, 1000, 5000]);
    }

    #[test]
    fn matroska_detection_uses_format_list() {
        let report = ProbeReport {
            container: "matroska,webm".to_string(),
            ..Default::default()
        };
        assert!(report.is_matroska());

        let mp4 = ProbeReport {
            container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            ..Default::default()
        };
        assert!(!mp4.is_matroska());
    }

    #[test]
    fn report_converts_to_item() {
        let report = ProbeReport {
            container: "matroska,webm".to_string(),
            duration_ms: 90_000,
            tracks: TrackLayout {
                video: 1,
                audio: 2,
                ..Default::default()
            },
            chapters: vec![vec![0, 45_000]],
            audio_sample_rate: Some(48000),
        };

        let item = report.into_item(Path::new("/r/ep01.mkv"));
        assert!(item.probed);
        assert!(item.has_audio);
        assert!(item.has_menu);
        assert_eq!(item.duration_ms, 90_000);
        assert_eq!(item.audio_sample_rate, Some(48000));
    }
}
