//! Media descriptor extraction.
//!
//! `describe` turns a path into a `MediaItem` and never fails: an unreadable
//! file becomes a descriptor with every capability off. Probing goes through
//! the `MediaProber` trait so the matcher and executor can be driven by
//! fixtures.

mod chapters;
mod describe;
mod ffprobe;
mod types;

use std::path::Path;

pub use chapters::{extract_chapter_editions, parse_chapter_editions, parse_timestamp_ms};
pub use describe::{describe, describe_all, fingerprint_all, DescriptorCache};
pub use ffprobe::{parse_ffprobe_json, FfprobeProber};
pub use types::{normalize_marks, ProbeError, ProbeReport, ProbeResult};

/// Source of raw descriptor facts for one file.
pub trait MediaProber: Send + Sync {
    fn probe(&self, path: &Path) -> ProbeResult<ProbeReport>;
}
