//! File probing using ffprobe JSON output.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use serde_json::Value;

use crate::config::ToolSettings;
use crate::models::{TrackKind, TrackLayout};
use crate::tools::run_tool;

use super::chapters::extract_chapter_editions;
use super::types::{normalize_marks, ProbeError, ProbeReport, ProbeResult};
use super::MediaProber;

/// Subtitle codecs that carry bitmaps rather than text.
const BITMAP_SUBTITLE_CODECS: &[&str] = &["hdmv_pgs_subtitle", "dvd_subtitle", "dvb_subtitle"];

/// Prober backed by ffprobe, with mkvextract for Matroska editions.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe: String,
    mkvextract: Option<String>,
    timeout: Duration,
}

impl FfprobeProber {
    /// Create a prober. Pass `None` for `mkvextract` to use ffprobe chapters
    /// only.
    pub fn new(ffprobe: impl Into<String>, mkvextract: Option<String>, timeout: Duration) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            mkvextract,
            timeout,
        }
    }

    /// Create a prober from tool settings.
    pub fn from_settings(tools: &ToolSettings) -> Self {
        let mkvextract = (!tools.mkvextract.is_empty()).then(|| tools.mkvextract.clone());
        Self::new(tools.ffprobe.clone(), mkvextract, tools.timeout())
    }

    fn run_ffprobe(&self, path: &Path) -> ProbeResult<Value> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-show_format",
            "-show_streams",
            "-show_chapters",
            "-of",
            "json",
        ])
        .arg(path);

        let output = run_tool(cmd, self.timeout)?.require_success()?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::from_settings(&ToolSettings::default())
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> ProbeResult<ProbeReport> {
        if !path.exists() {
            return Err(ProbeError::FileNotFound(path.to_path_buf()));
        }

        tracing::debug!("Probing file: {}", path.display());

        let json = self.run_ffprobe(path)?;
        let mut report = parse_ffprobe_json(&json)?;

        if report.is_matroska() {
            if let Some(mkvextract) = &self.mkvextract {
                match extract_chapter_editions(mkvextract, path, self.timeout) {
                    Ok(editions) if !editions.is_empty() => report.chapters = editions,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(
                            "mkvextract chapters failed for {}, keeping ffprobe chapters: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Parse `ffprobe -show_format -show_streams -show_chapters -of json`.
pub fn parse_ffprobe_json(json: &Value) -> ProbeResult<ProbeReport> {
    let format = json.get("format").ok_or_else(|| ProbeError::Parse {
        tool: "ffprobe".to_string(),
        message: "missing format section".to_string(),
    })?;

    let container = format
        .get("format_name")
        .and_then(|f| f.as_str())
        .unwrap_or("unknown")
        .to_string();

    let duration_ms = format
        .get("duration")
        .and_then(number_or_string)
        .map(secs_to_ms)
        .unwrap_or(0);

    let mut tracks = TrackLayout::default();
    let mut audio_sample_rate = None;

    if let Some(streams) = json.get("streams").and_then(|s| s.as_array()) {
        for stream in streams {
            let Some(kind) = classify_stream(stream) else {
                continue;
            };
            if kind == TrackKind::Audio && audio_sample_rate.is_none() {
                audio_sample_rate = stream
                    .get("sample_rate")
                    .and_then(number_or_string)
                    .map(|r| r as u32)
                    .filter(|&r| r > 0);
            }
            tracks.add(kind);
        }
    }

    let marks: Vec<u64> = json
        .get("chapters")
        .and_then(|c| c.as_array())
        .map(|chapters| {
            chapters
                .iter()
                .filter_map(|c| c.get("start_time").and_then(number_or_string))
                .map(secs_to_ms)
                .collect()
        })
        .unwrap_or_default();

    let chapters = if marks.is_empty() {
        Vec::new()
    } else {
        vec![normalize_marks(marks)]
    };

    Ok(ProbeReport {
        container,
        duration_ms,
        tracks,
        chapters,
        audio_sample_rate,
    })
}

/// Map an ffprobe stream to a track kind; data and unknown streams are
/// ignored.
fn classify_stream(stream: &Value) -> Option<TrackKind> {
    let codec_type = stream.get("codec_type")?.as_str()?;
    let codec_name = stream
        .get("codec_name")
        .and_then(|c| c.as_str())
        .unwrap_or("");
    let attached_pic = stream
        .get("disposition")
        .and_then(|d| d.get("attached_pic"))
        .and_then(|a| a.as_i64())
        .unwrap_or(0)
        == 1;

    match codec_type {
        "video" if attached_pic => Some(TrackKind::Image),
        "video" => Some(TrackKind::Video),
        "audio" => Some(TrackKind::Audio),
        "subtitle" if BITMAP_SUBTITLE_CODECS.contains(&codec_name) => Some(TrackKind::Image),
        "subtitle" => Some(TrackKind::Text),
        _ => None,
    }
}

/// ffprobe prints most numbers as strings.
fn number_or_string(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_streams_duration_and_chapters() {
        let json = json!({
            "streams": [
                {"index": 0, "codec_type": "video", "codec_name": "h264"},
                {"index": 1, "codec_type": "audio", "codec_name": "flac", "sample_rate": "48000"},
                {"index": 2, "codec_type": "audio", "codec_name": "aac", "sample_rate": "44100"},
                {"index": 3, "codec_type": "subtitle", "codec_name": "ass"},
                {"index": 4, "codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle"},
                {"index": 5, "codec_type": "video", "codec_name": "mjpeg",
                 "disposition": {"attached_pic": 1}},
                {"index": 6, "codec_type": "attachment", "codec_name": "ttf"}
            ],
            "chapters": [
                {"id": 1, "start_time": "60.000000"},
                {"id": 0, "start_time": "0.000000"}
            ],
            "format": {"format_name": "matroska,webm", "duration": "1425.040"}
        });

        let report = parse_ffprobe_json(&json).unwrap();
        assert_eq!(report.duration_ms, 1_425_040);
        assert_eq!(
            report.tracks,
            TrackLayout {
                video: 1,
                audio: 2,
                text: 1,
                image: 2
            }
        );
        assert_eq!(report.audio_sample_rate, Some(48000));
        assert_eq!(report.chapters, vec![vec![0, 60_000]]);
        assert!(report.is_matroska());
    }

    #[test]
    fn missing_duration_is_unknown() {
        let json = json!({"format": {"format_name": "mpegts"}, "streams": []});
        let report = parse_ffprobe_json(&json).unwrap();
        assert_eq!(report.duration_ms, 0);
        assert!(report.chapters.is_empty());
        assert_eq!(report.audio_sample_rate, None);
    }

    #[test]
    fn missing_format_is_an_error() {
        assert!(matches!(
            parse_ffprobe_json(&json!({"streams": []})),
            Err(ProbeError::Parse { .. })
        ));
    }

    #[test]
    fn probe_rejects_missing_file() {
        let prober = FfprobeProber::default();
        assert!(matches!(
            prober.probe(Path::new("/nonexistent/a.mkv")),
            Err(ProbeError::FileNotFound(_))
        ));
    }
}
