//! Sparse sample-based audio fingerprints.
//!
//! A fingerprint is the track's peak absolute amplitude followed by one raw
//! sample every `spacing_secs` seconds over a `window_secs` window. The
//! window starts at `peak_index mod sample_rate`, a sub-second phase that
//! survives leading trims by a whole multiple of the spacing as long as the
//! peak is present in both encodes. Any other trim shifts every sample point
//! off the grid. This is a coarse identity check, not a perceptual hash.

use std::fmt;
use std::str::FromStr;

use crate::models::MediaItem;

use super::decode::AudioDecoder;
use super::types::DecodeRequest;

/// Separator used in the encoded form.
const SEPARATOR: char = ',';

/// Fingerprint sampling parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// Seconds between sample points.
    pub spacing_secs: u32,
    /// Length of the sampled window in seconds.
    pub window_secs: u32,
    /// Matching blocks must be longer than this.
    pub block_threshold: usize,
    /// Decode rate when the item's own rate is unknown.
    pub fallback_sample_rate: u32,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            spacing_secs: 3,
            window_secs: 120,
            block_threshold: 4,
            fallback_sample_rate: 48000,
        }
    }
}

/// Parsed fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Peak absolute amplitude over the whole track.
    pub peak: i32,
    /// Sample values at the sampling points.
    pub samples: Vec<i32>,
}

impl Fingerprint {
    /// Compute a fingerprint from decoded samples.
    ///
    /// Returns `None` for empty or fully silent audio.
    pub fn from_samples(samples: &[i16], sample_rate: u32, config: &FingerprintConfig) -> Option<Self> {
        if samples.is_empty() || sample_rate == 0 || config.spacing_secs == 0 {
            return None;
        }

        let (max_idx, peak) = samples
            .iter()
            .enumerate()
            .map(|(i, &s)| (i, (s as i32).abs()))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if peak == 0 {
            return None;
        }

        let freq = sample_rate as usize;
        let start = max_idx % freq;
        let step = freq * config.spacing_secs as usize;
        let end = samples.len().min(start + freq * config.window_secs as usize);

        let points = (start..end)
            .step_by(step)
            .map(|i| samples[i] as i32)
            .collect();

        Some(Self {
            peak,
            samples: points,
        })
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.peak)?;
        for sample in &self.samples {
            write!(f, "{}{}", SEPARATOR, sample)?;
        }
        Ok(())
    }
}

/// Error for an unparseable fingerprint string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed fingerprint: {0}")]
pub struct FingerprintParseError(String);

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = s.split(SEPARATOR).map(|v| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| FingerprintParseError(s.to_string()))
        });

        let peak = values
            .next()
            .ok_or_else(|| FingerprintParseError(s.to_string()))??;
        let samples = values.collect::<Result<Vec<_>, _>>()?;

        Ok(Self { peak, samples })
    }
}

/// Whether two encoded fingerprints describe the same audio.
///
/// Peaks must be equal; then some contiguous run of sample points longer
/// than `threshold` must line up. Shorter runs count as coincidence.
pub fn compare(fp1: &str, fp2: &str, threshold: usize) -> bool {
    let (Ok(a), Ok(b)) = (fp1.parse::<Fingerprint>(), fp2.parse::<Fingerprint>()) else {
        return false;
    };

    if a.peak != b.peak {
        return false;
    }

    matching_blocks(&a.samples, &b.samples)
        .iter()
        .any(|&len| len > threshold)
}

/// Lengths of common contiguous blocks, found largest first.
///
/// Each found block is removed from both sequences before searching again,
/// so an insertion on one side splits agreement into separate blocks
/// instead of being skipped over.
pub fn matching_blocks(a: &[i32], b: &[i32]) -> Vec<usize> {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    let mut blocks = Vec::new();

    while let Some((i, j, len)) = longest_block(&a, &b) {
        blocks.push(len);
        a.drain(i..i + len);
        b.drain(j..j + len);
    }

    blocks
}

/// Longest common contiguous block as `(start_a, start_b, len)`.
///
/// Ties resolve to the block that ends earliest in `a`.
fn longest_block(a: &[i32], b: &[i32]) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        for j in 0..b.len() {
            cur[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let len = cur[j + 1];
            if len > best.map_or(0, |(_, _, l)| l) {
                best = Some((i + 1 - len, j + 1 - len, len));
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

/// Fingerprint the first audio track of an item.
///
/// Decode failures are logged and reported as "no fingerprint".
pub fn fingerprint_item(
    decoder: &dyn AudioDecoder,
    item: &MediaItem,
    config: &FingerprintConfig,
) -> Option<String> {
    if !item.has_audio {
        return None;
    }

    let sample_rate = item.audio_sample_rate.unwrap_or(config.fallback_sample_rate);
    let request = DecodeRequest::full(&item.path, 0, sample_rate);

    match decoder.decode(&request) {
        Ok(samples) => {
            let fingerprint = Fingerprint::from_samples(&samples, sample_rate, config);
            if fingerprint.is_none() {
                tracing::debug!("No fingerprint for silent track in {}", item.path.display());
            }
            fingerprint.map(|fp| fp.to_string())
        }
        Err(e) => {
            tracing::warn!("Fingerprint unavailable for {}: {}", item.path.display(), e);
            None
        }
    }
}
