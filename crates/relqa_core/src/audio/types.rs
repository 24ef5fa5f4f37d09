//! Core types for audio decoding.

use std::path::{Path, PathBuf};

use crate::tools::ToolError;

/// A request for mono 16-bit PCM from one audio track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    /// Source file.
    pub path: PathBuf,
    /// Audio track index (0 = first audio track).
    pub track_index: usize,
    /// First sample to return, at `sample_rate`.
    pub start_sample: usize,
    /// Number of samples to return; `None` decodes to the end.
    pub length_samples: Option<usize>,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
}

impl DecodeRequest {
    /// Decode a whole track.
    pub fn full(path: impl Into<PathBuf>, track_index: usize, sample_rate: u32) -> Self {
        Self {
            path: path.into(),
            track_index,
            start_sample: 0,
            length_samples: None,
            sample_rate,
        }
    }

    /// Restrict the request to a window.
    pub fn window(mut self, start_sample: usize, length_samples: usize) -> Self {
        self.start_sample = start_sample;
        self.length_samples = Some(length_samples);
        self
    }

    /// Start offset in seconds.
    pub fn start_secs(&self) -> f64 {
        self.start_sample as f64 / self.sample_rate as f64
    }

    /// Requested length in seconds, if bounded.
    pub fn length_secs(&self) -> Option<f64> {
        self.length_samples
            .map(|n| n as f64 / self.sample_rate as f64)
    }
}

/// Error types for decode operations.
///
/// A decode failure is never reported as silence: callers receive an error
/// and must treat the track as unavailable.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Source file not found.
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// The decoder tool failed or timed out.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The track produced no samples at all.
    #[error("No audio samples decoded from track {track_index} of {path}")]
    NoSamples { path: PathBuf, track_index: usize },

    /// The request itself is invalid.
    #[error("Invalid decode request: {0}")]
    InvalidRequest(String),
}

impl DecodeError {
    /// Build a `NoSamples` error for a request.
    pub fn no_samples(path: &Path, track_index: usize) -> Self {
        DecodeError::NoSamples {
            path: path.to_path_buf(),
            track_index,
        }
    }
}

/// Type alias for decode results.
pub type DecodeResult<T> = Result<T, DecodeError>;
