//! Cross-correlation alignment and residual comparison of two audio streams.
//!
//! The offset is found with FFT convolution of stream 1 against the time
//! reversal of stream 2. The peak is accepted only if
//! `(Σs1² + Σs2²) / peak ≤ ratio_threshold`. Since `a² + b² ≥ 2ab`, a perfect
//! match scores 2, so the ratio is a cheap stand-in for normalized
//! correlation strength.

use rustfft::{num_complex::Complex, FftPlanner};

/// Correlator thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatorConfig {
    /// Where the offset window begins, in seconds from the stream start.
    pub start_secs: u32,
    /// Seconds of audio used to find the offset.
    pub window_secs: u32,
    /// Maximum accepted energy/peak ratio.
    pub ratio_threshold: f64,
    /// Mean absolute residual above which streams differ.
    pub diff_threshold: f64,
    /// Rate both streams are decoded at.
    pub sample_rate: u32,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            start_secs: 0,
            window_secs: 30,
            ratio_threshold: 4.0,
            diff_threshold: 1.0,
            sample_rate: 48000,
        }
    }
}

impl CorrelatorConfig {
    /// Window start in samples.
    pub fn start_samples(&self) -> usize {
        self.start_secs as usize * self.sample_rate as usize
    }

    /// Offset window in samples.
    pub fn window_samples(&self) -> usize {
        self.window_secs as usize * self.sample_rate as usize
    }
}

/// Per-stream start offsets such that `s1[o1..]` aligns with `s2[o2..]`.
///
/// Returns `(0, 0)` when no convincing correlation peak exists.
pub fn offset(stream1: &[i16], stream2: &[i16], ratio_threshold: f64) -> (usize, usize) {
    let n = stream1.len().max(stream2.len());
    if n == 0 {
        return (0, 0);
    }

    let correlation = convolve_reversed(stream1, stream2, n);

    let (peak_idx, peak_val) = correlation
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });

    if peak_val <= 0.0 {
        return (0, 0);
    }

    let energy = sum_squares(stream1) + sum_squares(stream2);
    let ratio = energy / peak_val;
    if ratio > ratio_threshold {
        tracing::debug!("Correlation peak rejected: ratio {:.3} > {}", ratio, ratio_threshold);
        return (0, 0);
    }

    if peak_idx >= n - 1 {
        (peak_idx - (n - 1), 0)
    } else {
        (0, n - 1 - peak_idx)
    }
}

/// Full linear convolution of `a` with reversed `b`, both zero-padded to `n`.
///
/// Index `n - 1` is zero lag.
fn convolve_reversed(a: &[i16], b: &[i16], n: usize) -> Vec<f64> {
    let out_len = 2 * n - 1;
    let fft_len = out_len.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_len);
    let ifft = planner.plan_fft_inverse(fft_len);

    let mut fa: Vec<Complex<f64>> = a.iter().map(|&x| Complex::new(x as f64, 0.0)).collect();
    fa.resize(fft_len, Complex::new(0.0, 0.0));

    // b padded to n, then reversed
    let mut fb = vec![Complex::new(0.0, 0.0); fft_len];
    for (j, &x) in b.iter().enumerate() {
        fb[n - 1 - j] = Complex::new(x as f64, 0.0);
    }

    fft.process(&mut fa);
    fft.process(&mut fb);

    let mut product: Vec<Complex<f64>> = fa.iter().zip(fb.iter()).map(|(x, y)| x * y).collect();
    ifft.process(&mut product);

    let scale = 1.0 / fft_len as f64;
    product.iter().take(out_len).map(|c| c.re * scale).collect()
}

fn sum_squares(samples: &[i16]) -> f64 {
    samples.iter().map(|&s| (s as f64) * (s as f64)).sum()
}

/// Difference signal of two aligned streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residual {
    /// Signed difference, `max(len1, len2)` samples long.
    pub diff: Vec<i32>,
    /// Length of stream 1 after its offset.
    pub len1: usize,
    /// Length of stream 2 after its offset.
    pub len2: usize,
}

impl Residual {
    /// `Some((len1, len2))` when the aligned streams differ in length.
    pub fn length_mismatch(&self) -> Option<(usize, usize)> {
        (self.len1 != self.len2).then_some((self.len1, self.len2))
    }

    /// Mean absolute difference over the full declared length.
    pub fn mean_abs(&self) -> f64 {
        if self.diff.is_empty() {
            return 0.0;
        }
        let total: f64 = self.diff.iter().map(|&d| (d as f64).abs()).sum();
        total / self.diff.len() as f64
    }
}

/// Residual of two streams sliced at their offsets.
///
/// The longer stream's unmatched tail is compared against silence, so a
/// truncated encode scores as a difference.
pub fn residual(stream1: &[i16], stream2: &[i16], offset1: usize, offset2: usize) -> Residual {
    let a = &stream1[offset1.min(stream1.len())..];
    let b = &stream2[offset2.min(stream2.len())..];
    let len = a.len().max(b.len());

    let diff = (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0) as i32;
            let y = b.get(i).copied().unwrap_or(0) as i32;
            x - y
        })
        .collect();

    Residual {
        diff,
        len1: a.len(),
        len2: b.len(),
    }
}

/// Whether the residual's mean absolute value exceeds `threshold`.
pub fn is_materially_different(residual: &Residual, threshold: f64) -> bool {
    residual.mean_abs() > threshold
}

/// Outcome of comparing two streams.
#[derive(Debug, Clone)]
pub struct AudioVerdict {
    /// Alignment offsets in samples.
    pub offsets: (usize, usize),
    /// Residual over the aligned streams.
    pub residual: Residual,
    /// Mean absolute residual.
    pub mean_abs: f64,
    /// Whether the streams are materially different.
    pub different: bool,
    sample_rate: u32,
}

impl AudioVerdict {
    /// Offsets in milliseconds.
    pub fn offsets_ms(&self) -> (f64, f64) {
        let to_ms = |s: usize| s as f64 * 1000.0 / self.sample_rate.max(1) as f64;
        (to_ms(self.offsets.0), to_ms(self.offsets.1))
    }
}

/// Aligns and compares decoded streams.
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    config: CorrelatorConfig,
}

impl Correlator {
    pub fn new(config: CorrelatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    /// Find the offset on the configured window, then judge the full residual.
    ///
    /// Both windows begin at the same position, so the lag found there
    /// applies to the whole streams.
    pub fn compare_streams(&self, stream1: &[i16], stream2: &[i16]) -> AudioVerdict {
        let start = self.config.start_samples();
        let end = start.saturating_add(self.config.window_samples());
        let w1 = window_of(stream1, start, end);
        let w2 = window_of(stream2, start, end);

        let offsets = offset(w1, w2, self.config.ratio_threshold);
        let residual = residual(stream1, stream2, offsets.0, offsets.1);
        let mean_abs = residual.mean_abs();
        let different = mean_abs > self.config.diff_threshold;

        tracing::debug!(
            "Correlated streams: offsets {:?}, mean |diff| {:.4}, different={}",
            offsets,
            mean_abs,
            different
        );

        AudioVerdict {
            offsets,
            residual,
            mean_abs,
            different,
            sample_rate: self.config.sample_rate,
        }
    }
}

fn window_of(samples: &[i16], start: usize, end: usize) -> &[i16] {
    let end = end.min(samples.len());
    &samples[start.min(end)..end]
}
