//! Audio decode service.
//!
//! Fingerprinting and correlation depend on the `AudioDecoder` trait rather
//! than on ffmpeg directly, so they can run against in-memory decoders.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::tools::run_tool;

use super::types::{DecodeError, DecodeRequest, DecodeResult};

/// Source of mono 16-bit PCM samples.
pub trait AudioDecoder: Send + Sync {
    /// Decode the requested window of one audio track.
    fn decode(&self, request: &DecodeRequest) -> DecodeResult<Vec<i16>>;

    /// Decode several files' tracks and concatenate them in order.
    fn decode_concat(
        &self,
        paths: &[&Path],
        track_index: usize,
        sample_rate: u32,
    ) -> DecodeResult<Vec<i16>> {
        let mut samples = Vec::new();
        for path in paths {
            samples.extend(self.decode(&DecodeRequest::full(*path, track_index, sample_rate))?);
        }
        Ok(samples)
    }
}

/// Decoder that shells out to ffmpeg.
///
/// The audio is:
/// - Converted to mono (channel downmix)
/// - Resampled to the requested rate
/// - Output as raw little-endian s16 samples
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: String,
    timeout: Duration,
}

impl FfmpegDecoder {
    /// Create a decoder using the given ffmpeg executable.
    pub fn new(ffmpeg: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            timeout,
        }
    }

    fn build_command(&self, request: &DecodeRequest) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-nostdin", "-v", "error"]);

        if request.start_sample > 0 {
            cmd.arg("-ss").arg(format!("{:.6}", request.start_secs()));
        }

        cmd.arg("-i")
            .arg(&request.path)
            .arg("-map")
            .arg(format!("0:a:{}", request.track_index));

        if let Some(secs) = request.length_secs() {
            cmd.arg("-t").arg(format!("{:.6}", secs));
        }

        cmd.arg("-vn")
            .arg("-ac")
            .arg("1")
            .arg("-ar")
            .arg(request.sample_rate.to_string())
            .arg("-f")
            .arg("s16le")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("pipe:1");

        cmd
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg", Duration::from_secs(300))
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, request: &DecodeRequest) -> DecodeResult<Vec<i16>> {
        if request.sample_rate == 0 {
            return Err(DecodeError::InvalidRequest("sample rate is zero".to_string()));
        }
        if !request.path.exists() {
            return Err(DecodeError::SourceNotFound(request.path.clone()));
        }

        let output = run_tool(self.build_command(request), self.timeout)?.require_success()?;

        let mut samples = bytes_to_s16_samples(&output.stdout);
        if let Some(len) = request.length_samples {
            samples.truncate(len);
        }

        if samples.is_empty() {
            return Err(DecodeError::no_samples(&request.path, request.track_index));
        }

        tracing::debug!(
            "Decoded {} samples ({:.2}s) from {} track {}",
            samples.len(),
            samples.len() as f64 / request.sample_rate as f64,
            request.path.display(),
            request.track_index
        );

        Ok(samples)
    }
}

/// Convert raw bytes to i16 samples (little-endian); a trailing odd byte is
/// dropped.
fn bytes_to_s16_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect()
}
