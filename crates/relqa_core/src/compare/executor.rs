//! Per-group comparison of confirmed matches.
//!
//! For each comparable group the first subgroup tag is the source side and
//! every other tag is a reference side. Each (source, reference) pairing
//! gets audio, menu and structure reports; a failure in one never stops
//! the others.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::audio::{render_spectrogram, AudioDecoder, AudioVerdict, Correlator};
use crate::config::Settings;
use crate::logging::{LogLevel, MessagePrefix, RunLogger};
use crate::matching::timestamps_equal;
use crate::models::{GroupSide, MatchGroup, MatchPlan, MediaItem, TrackKind};

use super::types::{Category, CategoryReport, CompareResult, GroupReport, Outcome};

/// Runs comparisons for a reviewed plan.
pub struct Executor<'a> {
    decoder: &'a dyn AudioDecoder,
    descriptors: HashMap<PathBuf, MediaItem>,
    correlator: Correlator,
    chapter_tolerance_ms: u64,
    duration_tolerance_ms: u64,
    diagnostics_dir: Option<PathBuf>,
    logger: Option<&'a RunLogger>,
}

/// A side's members resolved to descriptors.
struct ResolvedSide<'s> {
    tag: &'s str,
    paths: Vec<&'s Path>,
    items: Vec<&'s MediaItem>,
}

impl ResolvedSide<'_> {
    /// Tracks of a kind that every member carries.
    fn common_tracks(&self, kind: TrackKind) -> usize {
        self.items
            .iter()
            .map(|i| i.tracks.count(kind))
            .min()
            .unwrap_or(0)
    }

    fn total_duration_ms(&self) -> Option<u64> {
        if self.items.iter().any(|i| i.duration_ms == 0) {
            return None;
        }
        Some(self.items.iter().map(|i| i.duration_ms).sum())
    }

    /// Chapter timeline: a single file's first chapter track, or the clip
    /// start offsets of concatenated files.
    fn timeline(&self) -> Vec<u64> {
        match self.items.as_slice() {
            [single] => single.first_chapter_track().to_vec(),
            clips => clips
                .iter()
                .scan(0u64, |start, clip| {
                    let this = *start;
                    *start += clip.duration_ms;
                    Some(this)
                })
                .collect(),
        }
    }
}

impl<'a> Executor<'a> {
    /// Create an executor. `descriptors` should cover every member path;
    /// missing ones are treated as unprobed.
    pub fn new(
        decoder: &'a dyn AudioDecoder,
        descriptors: Vec<MediaItem>,
        settings: &Settings,
        logger: Option<&'a RunLogger>,
    ) -> Self {
        let diagnostics_dir = settings
            .correlation
            .spectrograms
            .then(|| PathBuf::from(&settings.paths.diagnostics_folder));

        Self {
            decoder,
            descriptors: descriptors
                .into_iter()
                .map(|item| (item.path.clone(), item))
                .collect(),
            correlator: Correlator::new(settings.correlator_config()),
            chapter_tolerance_ms: settings.matching.chapter_tolerance_ms,
            duration_tolerance_ms: settings.matching.duration_tolerance_ms,
            diagnostics_dir,
            logger,
        }
    }

    /// Compare every committed group of `plan`.
    pub fn run(&self, plan: &MatchPlan) -> Vec<GroupReport> {
        self.emit(LogLevel::Info, MessagePrefix::Phase, "Comparison");
        plan.groups().iter().map(|g| self.run_group(g)).collect()
    }

    /// Compare one group.
    pub fn run_group(&self, group: &MatchGroup) -> GroupReport {
        self.emit(
            LogLevel::Info,
            MessagePrefix::Section,
            &format!("Group {}", group.group_id),
        );

        if !group.is_comparable() {
            let reason = "fewer than two enabled sides".to_string();
            self.emit(LogLevel::Info, MessagePrefix::None, &format!("Skipped: {}", reason));
            return GroupReport {
                group_id: group.group_id.clone(),
                reports: Vec::new(),
                skipped: Some(reason),
            };
        }

        let unprobed: Vec<MediaItem> = group
            .members
            .iter()
            .filter(|m| !self.descriptors.contains_key(&m.path))
            .map(|m| MediaItem::unprobed(&m.path))
            .collect();

        let sides: Vec<ResolvedSide<'_>> = group
            .sides()
            .into_iter()
            .map(|side| self.resolve(&side, &unprobed))
            .collect();

        let mut reports = Vec::new();
        if let Some((source, references)) = sides.split_first() {
            for reference in references {
                reports.extend(self.compare_pair(&group.group_id, source, reference));
            }
        }

        GroupReport {
            group_id: group.group_id.clone(),
            reports,
            skipped: None,
        }
    }

    fn resolve<'s>(&'s self, side: &GroupSide<'s>, unprobed: &'s [MediaItem]) -> ResolvedSide<'s> {
        let paths = side.paths();
        let items = paths
            .iter()
            .filter_map(|p| {
                self.descriptors
                    .get(*p)
                    .or_else(|| unprobed.iter().find(|i| i.path == *p))
            })
            .collect();
        ResolvedSide {
            tag: side.tag,
            paths,
            items,
        }
    }

    fn compare_pair(
        &self,
        group_id: &str,
        source: &ResolvedSide<'_>,
        reference: &ResolvedSide<'_>,
    ) -> Vec<CategoryReport> {
        let mut reports = Vec::new();
        let members = || source.items.iter().chain(reference.items.iter());

        if members().any(|i| i.has_audio) {
            let tracks = source
                .common_tracks(TrackKind::Audio)
                .min(reference.common_tracks(TrackKind::Audio));
            if tracks == 0 {
                reports.push(CategoryReport::new(
                    Category::Audio(0),
                    source.tag,
                    reference.tag,
                    Outcome::Skipped("no audio track present on both sides".to_string()),
                ));
            }
            for track in 0..tracks {
                reports.push(self.audio_report(group_id, source, reference, track));
            }
        }

        if members().any(|i| i.has_menu) {
            reports.push(self.menu_report(source, reference));
        }

        reports.push(self.structure_report(source, reference));

        for report in &reports {
            self.log_report(report);
        }
        reports
    }

    fn audio_report(
        &self,
        group_id: &str,
        source: &ResolvedSide<'_>,
        reference: &ResolvedSide<'_>,
        track: usize,
    ) -> CategoryReport {
        let category = Category::Audio(track);

        let verdict = match self.correlate_track(source, reference, track) {
            Ok(verdict) => verdict,
            Err(e) => {
                // Tool stderr can span lines; only the first goes in the verdict.
                let text = e.to_string();
                let mut lines = text.lines();
                let reason = lines.next().unwrap_or_default().to_string();
                let mut report =
                    CategoryReport::new(category, source.tag, reference.tag, Outcome::Failed(reason));
                report.tool_output = lines.map(str::to_string).collect();
                return report;
            }
        };

        let outcome = if verdict.different {
            Outcome::Different
        } else {
            Outcome::Same
        };
        let mut report = CategoryReport::new(category, source.tag, reference.tag, outcome);

        let (ms1, ms2) = verdict.offsets_ms();
        report.details.push(format!("offsets {:.1}/{:.1} ms", ms1, ms2));
        report.details.push(format!("mean |diff| {:.4}", verdict.mean_abs));

        if let Some((len1, len2)) = verdict.residual.length_mismatch() {
            report.warnings.push(format!(
                "length mismatch after alignment: {} vs {} samples",
                len1, len2
            ));
        }

        if verdict.different {
            if let Some(dir) = &self.diagnostics_dir {
                let path = dir.join(artifact_name(group_id, source.tag, reference.tag, track));
                match write_artifact(&verdict, &path) {
                    Ok(()) => report.artifact = Some(path),
                    Err(e) => report.warnings.push(e.to_string()),
                }
            }
        }

        report
    }

    fn correlate_track(
        &self,
        source: &ResolvedSide<'_>,
        reference: &ResolvedSide<'_>,
        track: usize,
    ) -> CompareResult<AudioVerdict> {
        let rate = self.correlator.config().sample_rate;
        let s1 = self.decoder.decode_concat(&source.paths, track, rate)?;
        let s2 = self.decoder.decode_concat(&reference.paths, track, rate)?;
        Ok(self.correlator.compare_streams(&s1, &s2))
    }

    fn menu_report(&self, source: &ResolvedSide<'_>, reference: &ResolvedSide<'_>) -> CategoryReport {
        let t1 = source.timeline();
        let t2 = reference.timeline();

        // Clip starts come from summed durations, so they drift by more
        // than chapter rounding.
        let tolerance = if source.items.len() > 1 || reference.items.len() > 1 {
            self.duration_tolerance_ms
        } else {
            self.chapter_tolerance_ms
        };

        let outcome = if !t1.is_empty() && !t2.is_empty() && timestamps_equal(&t1, &t2, tolerance) {
            Outcome::Same
        } else {
            Outcome::Different
        };

        let mut report = CategoryReport::new(Category::Menu, source.tag, reference.tag, outcome);
        report
            .details
            .push(format!("{} vs {} marks", t1.len(), t2.len()));
        if report.outcome == Outcome::Different {
            report.details.push(format!("{:?} vs {:?}", t1, t2));
        }
        report
    }

    fn structure_report(
        &self,
        source: &ResolvedSide<'_>,
        reference: &ResolvedSide<'_>,
    ) -> CategoryReport {
        let mut different = false;
        let mut details = Vec::new();
        let mut warnings = Vec::new();

        for kind in [TrackKind::Video, TrackKind::Image, TrackKind::Text] {
            let (n1, n2) = (source.common_tracks(kind), reference.common_tracks(kind));
            if n1 != n2 {
                different = true;
                details.push(format!("{} tracks {} vs {}", kind.label(), n1, n2));
            }
        }

        match (source.total_duration_ms(), reference.total_duration_ms()) {
            (Some(d1), Some(d2)) => {
                let clips = source.items.len().max(reference.items.len()) as u64;
                if d1.abs_diff(d2) > self.duration_tolerance_ms * clips {
                    different = true;
                    details.push(format!("duration {} vs {} ms", d1, d2));
                }
            }
            _ => warnings.push("duration unknown on at least one member".to_string()),
        }

        let outcome = if different {
            Outcome::Different
        } else {
            Outcome::Same
        };
        let mut report = CategoryReport::new(Category::Structure, source.tag, reference.tag, outcome);
        report.details = details;
        report.warnings = warnings;
        report
    }

    fn log_report(&self, report: &CategoryReport) {
        let (level, prefix) = match report.outcome {
            Outcome::Same => (LogLevel::Info, MessagePrefix::Ok),
            Outcome::Different => (LogLevel::Warn, MessagePrefix::Diff),
            Outcome::Failed(_) => (LogLevel::Error, MessagePrefix::Error),
            Outcome::Skipped(_) => (LogLevel::Info, MessagePrefix::None),
        };
        self.emit(level, prefix, &report.summary());

        for line in &report.tool_output {
            match self.logger {
                Some(logger) => logger.output_line(line),
                None => tracing::debug!("{}", line),
            }
        }
        for warning in &report.warnings {
            self.emit(LogLevel::Warn, MessagePrefix::Warning, warning);
        }
        if let Some(artifact) = &report.artifact {
            self.emit(
                LogLevel::Info,
                MessagePrefix::None,
                &format!("Spectrogram: {}", artifact.display()),
            );
        }
    }

    fn emit(&self, level: LogLevel, prefix: MessagePrefix, message: &str) {
        match self.logger {
            Some(logger) => logger.prefixed(level, prefix, message),
            None => {
                let line = prefix.format(message);
                match level {
                    LogLevel::Error => tracing::error!("{}", line),
                    LogLevel::Warn => tracing::warn!("{}", line),
                    _ => tracing::info!("{}", line),
                }
            }
        }
    }
}

fn write_artifact(verdict: &AudioVerdict, path: &Path) -> CompareResult<()> {
    render_spectrogram(&verdict.residual.diff, path)?;
    Ok(())
}

/// `<group>_<src>-vs-<ref>_a<track>.png`, tags restricted to `[A-Za-z0-9._-]`.
pub fn artifact_name(group_id: &str, source_tag: &str, reference_tag: &str, track: usize) -> String {
    format!(
        "{}_{}-vs-{}_a{}.png",
        safe_component(group_id),
        safe_component(source_tag),
        safe_component(reference_tag),
        track
    )
}

fn safe_component(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
