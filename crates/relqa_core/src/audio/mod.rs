//! Audio decoding, fingerprinting and correlation.
//!
//! - `decode`: the `AudioDecoder` seam and its ffmpeg implementation
//! - `fingerprint`: sparse sample fingerprints for cheap identity matching
//! - `correlate`: FFT offset detection and residual verdicts
//! - `spectrogram`: PNG artifacts for flagged residuals

pub mod correlate;
pub mod decode;
pub mod fingerprint;
pub mod spectrogram;
pub mod types;

pub use correlate::{
    is_materially_different, offset, residual, AudioVerdict, Correlator, CorrelatorConfig, Residual,
};
pub use decode::{AudioDecoder, FfmpegDecoder};
pub use fingerprint::{compare, fingerprint_item, Fingerprint, FingerprintConfig};
pub use spectrogram::{render_spectrogram, SPECTROGRAM_HEIGHT, SPECTROGRAM_WIDTH};
pub use types::{DecodeError, DecodeRequest, DecodeResult};
