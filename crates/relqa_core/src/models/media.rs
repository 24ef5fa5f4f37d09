//! Media item descriptors (one physical file).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of an elementary track inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    /// Text subtitles (SRT, ASS, ...).
    Text,
    /// Bitmap subtitles and attached pictures.
    Image,
}

impl TrackKind {
    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Text => "text",
            TrackKind::Image => "image",
        }
    }
}

/// Track composition of a file, as counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub video: usize,
    pub audio: usize,
    pub text: usize,
    pub image: usize,
}

impl TrackLayout {
    /// Number of tracks of the given kind.
    pub fn count(&self, kind: TrackKind) -> usize {
        match kind {
            TrackKind::Video => self.video,
            TrackKind::Audio => self.audio,
            TrackKind::Text => self.text,
            TrackKind::Image => self.image,
        }
    }

    /// Increment the counter for a kind.
    pub fn add(&mut self, kind: TrackKind) {
        match kind {
            TrackKind::Video => self.video += 1,
            TrackKind::Audio => self.audio += 1,
            TrackKind::Text => self.text += 1,
            TrackKind::Image => self.image += 1,
        }
    }
}

/// Descriptor of one media file, built once per matching run.
///
/// A `duration_ms` of 0 means the duration is unknown. Chapter marks are
/// grouped per chapter track (edition); the inner lists are strictly
/// increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// File path, unique within a run.
    pub path: PathBuf,
    /// Duration in milliseconds (0 = unknown).
    pub duration_ms: u64,
    /// Whether the file carries at least one chapter track.
    pub has_menu: bool,
    /// Whether the file carries at least one audio track.
    pub has_audio: bool,
    /// Chapter marks in milliseconds, one list per chapter track.
    pub menu_timestamps: Vec<Vec<u64>>,
    /// Sparse audio fingerprint, if sampling was enabled and succeeded.
    pub audio_fingerprint: Option<String>,
    /// Track composition.
    pub tracks: TrackLayout,
    /// Sample rate of the first audio track.
    pub audio_sample_rate: Option<u32>,
    /// False when the descriptor could not be probed.
    pub probed: bool,
}

impl MediaItem {
    /// Descriptor for a file that could not be probed: every capability off.
    pub fn unprobed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            duration_ms: 0,
            has_menu: false,
            has_audio: false,
            menu_timestamps: Vec::new(),
            audio_fingerprint: None,
            tracks: TrackLayout::default(),
            audio_sample_rate: None,
            probed: false,
        }
    }

    /// Start a descriptor for a successfully probed file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            probed: true,
            ..Self::unprobed(path)
        }
    }

    /// Set the duration.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the chapter tracks. `has_menu` follows whether any mark exists.
    pub fn with_chapters(mut self, tracks: Vec<Vec<u64>>) -> Self {
        self.has_menu = tracks.iter().any(|t| !t.is_empty());
        self.menu_timestamps = tracks;
        self
    }

    /// Set the audio fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.audio_fingerprint = Some(fingerprint.into());
        self
    }

    /// Set the track layout. `has_audio` follows the audio count.
    pub fn with_tracks(mut self, tracks: TrackLayout) -> Self {
        self.has_audio = tracks.audio > 0;
        self.tracks = tracks;
        self
    }

    /// Set the first audio track's sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.audio_sample_rate = Some(sample_rate);
        self
    }

    /// File name component, used by name-based heuristics and reports.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    /// First chapter track, or an empty slice.
    pub fn first_chapter_track(&self) -> &[u64] {
        self.menu_timestamps
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// File name of a path, falling back to the whole path.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
