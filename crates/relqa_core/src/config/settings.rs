//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::{CorrelatorConfig, FingerprintConfig};
use crate::logging::{LogConfig, LogLevel};
use crate::matching::MatcherConfig;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Matcher tolerances.
    #[serde(default)]
    pub matching: MatchingSettings,

    /// Audio fingerprint sampling.
    #[serde(default)]
    pub fingerprint: FingerprintSettings,

    /// Audio correlation thresholds.
    #[serde(default)]
    pub correlation: CorrelationSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Descriptor probing.
    #[serde(default)]
    pub probe: ProbeSettings,
}

impl Settings {
    /// Matcher configuration derived from these settings.
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            chapter_tolerance_ms: self.matching.chapter_tolerance_ms,
            duration_tolerance_ms: self.matching.duration_tolerance_ms,
            fingerprint_threshold: self.fingerprint.block_threshold,
            use_fingerprints: self.matching.use_fingerprints,
        }
    }

    /// Fingerprint configuration derived from these settings.
    pub fn fingerprint_config(&self) -> FingerprintConfig {
        FingerprintConfig {
            spacing_secs: self.fingerprint.spacing_secs,
            window_secs: self.fingerprint.window_secs,
            block_threshold: self.fingerprint.block_threshold,
            fallback_sample_rate: self.fingerprint.fallback_sample_rate,
        }
    }

    /// Correlator configuration derived from these settings.
    pub fn correlator_config(&self) -> CorrelatorConfig {
        CorrelatorConfig {
            start_secs: self.correlation.start_secs,
            window_secs: self.correlation.window_secs,
            ratio_threshold: self.correlation.ratio_threshold,
            diff_threshold: self.correlation.diff_threshold,
            sample_rate: self.correlation.sample_rate,
        }
    }

    /// Run logger configuration derived from these settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.logging.level,
            compact: self.logging.compact,
            error_tail: self.logging.error_tail as usize,
            show_timestamps: self.logging.show_timestamps,
        }
    }
}

/// Output folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Folder for spectrogram artifacts.
    #[serde(default = "default_diagnostics_folder")]
    pub diagnostics_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_diagnostics_folder() -> String {
    ".diagnostics".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
            diagnostics_folder: default_diagnostics_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written to the run log.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep external tool output out of the log unless an error occurs.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Prefix log lines with a wall-clock timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Number of tail lines shown after an error.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            show_timestamps: true,
            error_tail: default_error_tail(),
        }
    }
}

/// Matcher tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingSettings {
    /// Maximum per-mark difference for chapter equality (ms).
    #[serde(default = "default_chapter_tolerance")]
    pub chapter_tolerance_ms: u64,

    /// Maximum duration difference for duration and slicing matches (ms).
    #[serde(default = "default_duration_tolerance")]
    pub duration_tolerance_ms: u64,

    /// Run the audio fingerprint pass.
    #[serde(default)]
    pub use_fingerprints: bool,
}

fn default_chapter_tolerance() -> u64 {
    50
}

fn default_duration_tolerance() -> u64 {
    100
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            chapter_tolerance_ms: default_chapter_tolerance(),
            duration_tolerance_ms: default_duration_tolerance(),
            use_fingerprints: false,
        }
    }
}

/// Audio fingerprint sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintSettings {
    /// Matching blocks must be longer than this many sample points.
    #[serde(default = "default_block_threshold")]
    pub block_threshold: usize,

    /// Seconds between sample points.
    #[serde(default = "default_spacing")]
    pub spacing_secs: u32,

    /// Length of the sampled window in seconds.
    #[serde(default = "default_fp_window")]
    pub window_secs: u32,

    /// Decode rate used when the track's own rate is unknown.
    #[serde(default = "default_sample_rate")]
    pub fallback_sample_rate: u32,
}

fn default_block_threshold() -> usize {
    4
}

fn default_spacing() -> u32 {
    3
}

fn default_fp_window() -> u32 {
    120
}

fn default_sample_rate() -> u32 {
    48000
}

impl Default for FingerprintSettings {
    fn default() -> Self {
        Self {
            block_threshold: default_block_threshold(),
            spacing_secs: default_spacing(),
            window_secs: default_fp_window(),
            fallback_sample_rate: default_sample_rate(),
        }
    }
}

/// Audio correlation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationSettings {
    /// Seconds into each stream where the offset window begins.
    #[serde(default)]
    pub start_secs: u32,

    /// Seconds decoded from each stream for offset detection.
    #[serde(default = "default_xcorr_window")]
    pub window_secs: u32,

    /// Maximum `(sum(a^2) + sum(b^2)) / peak` for an accepted offset.
    #[serde(default = "default_ratio_threshold")]
    pub ratio_threshold: f64,

    /// Mean absolute residual (PCM units) above which streams differ.
    #[serde(default = "default_diff_threshold")]
    pub diff_threshold: f64,

    /// Decode rate for correlation.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Write spectrogram images for differing streams.
    #[serde(default = "default_true")]
    pub spectrograms: bool,
}

fn default_xcorr_window() -> u32 {
    30
}

fn default_ratio_threshold() -> f64 {
    4.0
}

fn default_diff_threshold() -> f64 {
    1.0
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        Self {
            start_secs: 0,
            window_secs: default_xcorr_window(),
            ratio_threshold: default_ratio_threshold(),
            diff_threshold: default_diff_threshold(),
            sample_rate: default_sample_rate(),
            spectrograms: true,
        }
    }
}

/// External tool locations and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    #[serde(default = "default_mkvextract")]
    pub mkvextract: String,

    /// Seconds before an external decode is abandoned.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_mkvextract() -> String {
    "mkvextract".to_string()
}

fn default_timeout() -> u64 {
    300
}

impl ToolSettings {
    /// Decode timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            mkvextract: default_mkvextract(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Descriptor probing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Sources live on rotational storage; probe one file at a time.
    #[serde(default)]
    pub rotational: bool,

    /// Worker count for solid-state storage (0 = one per core).
    #[serde(default)]
    pub workers: usize,
}

impl ProbeSettings {
    /// Worker count to use for the probe pool (0 = pool default).
    pub fn worker_count(&self) -> usize {
        if self.rotational {
            1
        } else {
            self.workers
        }
    }
}

/// Tables of the settings file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Matching,
    Fingerprint,
    Correlation,
    Tools,
    Probe,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 7] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Matching,
        ConfigSection::Fingerprint,
        ConfigSection::Correlation,
        ConfigSection::Tools,
        ConfigSection::Probe,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Matching => "matching",
            ConfigSection::Fingerprint => "fingerprint",
            ConfigSection::Correlation => "correlation",
            ConfigSection::Tools => "tools",
            ConfigSection::Probe => "probe",
        }
    }

    /// Comment written above the table in generated files.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output folders",
            ConfigSection::Logging => "Run log configuration",
            ConfigSection::Matching => "Matcher tolerances",
            ConfigSection::Fingerprint => "Sparse audio fingerprint sampling",
            ConfigSection::Correlation => "Audio cross-correlation and residual thresholds",
            ConfigSection::Tools => "External tools",
            ConfigSection::Probe => "Descriptor probing",
        }
    }
}
