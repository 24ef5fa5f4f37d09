//! The five-pass matcher.
//!
//! Passes run from highest to lowest confidence: chapter timestamps, audio
//! fingerprints, durations, chapter-interval slicing. An item claimed by an
//! earlier pass is never reconsidered by a later one. Whatever is left ends
//! up in the unmatched bucket, so every input path appears in the plan
//! exactly once.

use std::fmt;
use std::path::PathBuf;

use crate::audio::fingerprint;
use crate::models::{GroupMember, MatchGroup, MatchPlan, MediaItem};

use super::pool::{ItemPool, Side};
use super::strategy::{durations_match, menu_cluster, slice_intervals, timestamps_equal};

/// Matcher tolerances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Maximum per-mark difference for timestamp equality.
    pub chapter_tolerance_ms: u64,
    /// Maximum duration difference for duration and slicing matches.
    pub duration_tolerance_ms: u64,
    /// Fingerprint blocks must be longer than this.
    pub fingerprint_threshold: usize,
    /// Run the fingerprint pass.
    pub use_fingerprints: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            chapter_tolerance_ms: 50,
            duration_tolerance_ms: 100,
            fingerprint_threshold: 4,
            use_fingerprints: false,
        }
    }
}

/// Matching pass identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    Chapters,
    Fingerprint,
    Duration,
    Slicing,
}

impl MatchPass {
    pub fn label(&self) -> &'static str {
        match self {
            MatchPass::Chapters => "chapters",
            MatchPass::Fingerprint => "fingerprint",
            MatchPass::Duration => "duration",
            MatchPass::Slicing => "slicing",
        }
    }
}

/// Non-fatal matching outcomes worth a reviewer's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEventKind {
    /// Several candidates; nothing was claimed.
    Ambiguous,
    /// The item carried a signal but nothing matched it.
    NoMatch,
}

/// One ambiguity or miss during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    pub pass: MatchPass,
    pub kind: MatchEventKind,
    pub item: PathBuf,
    pub candidates: Vec<PathBuf>,
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MatchEventKind::NoMatch => write!(
                f,
                "{} pass: no counterpart for {}",
                self.pass.label(),
                self.item.display()
            ),
            MatchEventKind::Ambiguous => {
                write!(
                    f,
                    "{} pass: {} candidates for {}:",
                    self.pass.label(),
                    self.candidates.len(),
                    self.item.display()
                )?;
                for c in &self.candidates {
                    write!(f, " {}", c.display())?;
                }
                Ok(())
            }
        }
    }
}

/// Plan plus the events raised while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub plan: MatchPlan,
    pub events: Vec<MatchEvent>,
}

/// Pairs items of two releases into a `MatchPlan`.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match `old` against `new`.
    ///
    /// Single-threaded and free of I/O; identical inputs give identical
    /// outcomes.
    pub fn run(&self, old: &[MediaItem], new: &[MediaItem]) -> MatchOutcome {
        let mut run = MatchRun::new(&self.config, old, new);

        if old.is_empty() != new.is_empty() {
            tracing::info!("One side is empty; skipping matching passes");
            run.residue();
            return run.finish();
        }

        run.chapter_pass();
        if self.config.use_fingerprints {
            run.fingerprint_pass();
        }
        run.duration_pass(Side::A);
        run.duration_pass(Side::B);
        run.slicing_pass(Side::A);
        run.slicing_pass(Side::B);
        run.residue();

        run.finish()
    }
}

/// Member staged for a commit: side, pool index, subgroup tag.
type Staged = (Side, usize, String);

/// Mutable state of one matcher run.
struct MatchRun<'a> {
    config: &'a MatcherConfig,
    a: ItemPool<'a>,
    b: ItemPool<'a>,
    plan: MatchPlan,
    events: Vec<MatchEvent>,
    groups_committed: usize,
}

impl<'a> MatchRun<'a> {
    fn new(config: &'a MatcherConfig, old: &'a [MediaItem], new: &'a [MediaItem]) -> Self {
        Self {
            config,
            a: ItemPool::new(Side::A, old),
            b: ItemPool::new(Side::B, new),
            plan: MatchPlan::new(),
            events: Vec::new(),
            groups_committed: 0,
        }
    }

    fn pool(&self, side: Side) -> &ItemPool<'a> {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    fn pool_mut(&mut self, side: Side) -> &mut ItemPool<'a> {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    /// Claim the staged members and record them as the next group, side A
    /// members first.
    fn commit(&mut self, pass: MatchPass, mut staged: Vec<Staged>) {
        staged.sort_by_key(|(side, _, _)| *side != Side::A);
        self.commit_in_order(pass, staged);
    }

    /// Claim the staged members in the given order. The first member's tag
    /// becomes the comparison source.
    fn commit_in_order(&mut self, pass: MatchPass, staged: Vec<Staged>) {
        self.groups_committed += 1;
        let mut group = MatchGroup::new(format!("{:03}", self.groups_committed));

        for (side, idx, tag) in staged {
            self.pool_mut(side).claim(idx);
            group.push(GroupMember::new(tag, &self.pool(side).item(idx).path));
        }

        tracing::info!(
            "[{}] group {}: {}",
            pass.label(),
            group.group_id,
            group
                .members
                .iter()
                .map(|m| format!("{}={}", m.subgroup_tag, m.path.display()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.plan.push_group(group);
    }

    fn commit_pair(&mut self, pass: MatchPass, primary: Side, p_idx: usize, s_idx: usize) {
        let secondary = primary.other();
        self.commit(
            pass,
            vec![
                (primary, p_idx, primary.tag().to_string()),
                (secondary, s_idx, secondary.tag().to_string()),
            ],
        );
    }

    fn record(
        &mut self,
        pass: MatchPass,
        kind: MatchEventKind,
        side: Side,
        idx: usize,
        candidates: &[usize],
    ) {
        let other = self.pool(side.other());
        let event = MatchEvent {
            pass,
            kind,
            item: self.pool(side).item(idx).path.clone(),
            candidates: candidates.iter().map(|&i| other.item(i).path.clone()).collect(),
        };
        tracing::warn!("{}", event);
        self.events.push(event);
    }

    /// A→B pass with the 0/1/many policy over a signal and a predicate.
    fn one_to_one_pass(
        &mut self,
        pass: MatchPass,
        has_signal: impl Fn(&MediaItem) -> bool,
        matches: impl Fn(&MediaItem, &MediaItem) -> bool,
    ) {
        for a_idx in self.a.unclaimed() {
            let a = self.a.item(a_idx);
            if !has_signal(a) {
                continue;
            }

            let candidates = self.b.candidates(|b| has_signal(b) && matches(a, b));
            match candidates.len() {
                0 => self.record(pass, MatchEventKind::NoMatch, Side::A, a_idx, &[]),
                1 => self.commit_pair(pass, Side::A, a_idx, candidates[0]),
                _ => self.record(pass, MatchEventKind::Ambiguous, Side::A, a_idx, &candidates),
            }
        }
    }

    fn chapter_pass(&mut self) {
        let tolerance = self.config.chapter_tolerance_ms;
        self.one_to_one_pass(
            MatchPass::Chapters,
            |item| !item.first_chapter_track().is_empty(),
            |a, b| timestamps_equal(a.first_chapter_track(), b.first_chapter_track(), tolerance),
        );
    }

    fn fingerprint_pass(&mut self) {
        let threshold = self.config.fingerprint_threshold;
        self.one_to_one_pass(
            MatchPass::Fingerprint,
            |item| item.audio_fingerprint.is_some(),
            |a, b| match (a.audio_fingerprint.as_deref(), b.audio_fingerprint.as_deref()) {
                (Some(x), Some(y)) => fingerprint::compare(x, y, threshold),
                _ => false,
            },
        );
    }

    /// Duration matching from `primary` into the other side.
    fn duration_pass(&mut self, primary: Side) {
        let secondary = primary.other();
        let tolerance = self.config.duration_tolerance_ms;

        for p_idx in self.pool(primary).unclaimed() {
            let p = self.pool(primary).item(p_idx);
            if p.duration_ms == 0 {
                continue;
            }

            let candidates = self
                .pool(secondary)
                .candidates(|s| durations_match(p.duration_ms, s.duration_ms, tolerance));

            match candidates.len() {
                0 => {}
                1 => self.commit_pair(MatchPass::Duration, primary, p_idx, candidates[0]),
                _ => {
                    let items: Vec<&MediaItem> = candidates
                        .iter()
                        .map(|&i| self.pool(secondary).item(i))
                        .collect();

                    if menu_cluster(p, &items) {
                        let mut staged = vec![(primary, p_idx, primary.tag().to_string())];
                        staged.extend(candidates.iter().enumerate().map(|(k, &i)| {
                            (secondary, i, format!("{}.{}", secondary.tag(), k + 1))
                        }));
                        // Primary first, so the cluster is compared
                        // against the single file on the other side.
                        self.commit_in_order(MatchPass::Duration, staged);
                    } else {
                        self.record(
                            MatchPass::Duration,
                            MatchEventKind::Ambiguous,
                            primary,
                            p_idx,
                            &candidates,
                        );
                    }
                }
            }
        }
    }

    /// Match one chaptered item against several clips of the other side.
    fn slicing_pass(&mut self, primary: Side) {
        let secondary = primary.other();
        let tolerance = self.config.duration_tolerance_ms;

        for p_idx in self.pool(primary).unclaimed() {
            let p = self.pool(primary).item(p_idx);
            let marks = p.first_chapter_track();
            if marks.len() < 2 {
                continue;
            }

            let intervals = slice_intervals(marks, p.duration_ms);
            if intervals.is_empty() {
                continue;
            }

            let mut claims: Vec<usize> = Vec::with_capacity(intervals.len());
            for &interval in &intervals {
                let found = self
                    .pool(secondary)
                    .candidates(|s| durations_match(interval, s.duration_ms, tolerance))
                    .into_iter()
                    .find(|i| !claims.contains(i));
                match found {
                    Some(i) => claims.push(i),
                    None => break,
                }
            }

            if claims.len() < intervals.len() {
                tracing::debug!(
                    "Slicing {}: {}/{} intervals matched, released",
                    p.path.display(),
                    claims.len(),
                    intervals.len()
                );
                continue;
            }

            let mut staged = vec![(primary, p_idx, primary.tag().to_string())];
            staged.extend(claims.into_iter().map(|i| (secondary, i, secondary.tag().to_string())));
            self.commit(MatchPass::Slicing, staged);
        }
    }

    /// Everything still unclaimed becomes a singleton bucket entry.
    fn residue(&mut self) {
        for side in [Side::A, Side::B] {
            let pool = self.pool(side);
            let paths: Vec<PathBuf> = pool
                .unclaimed()
                .into_iter()
                .map(|i| pool.item(i).path.clone())
                .collect();
            if !paths.is_empty() {
                tracing::info!("{} unmatched item(s) on the {} side", paths.len(), side.label());
            }
            for path in paths {
                self.plan.push_unmatched(path);
            }
        }
    }

    fn finish(self) -> MatchOutcome {
        MatchOutcome {
            plan: self.plan,
            events: self.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnabledFlag;

    fn chaptered(name: &str, marks: &[u64]) -> MediaItem {
        MediaItem::new(name).with_chapters(vec![marks.to_vec()])
    }

    fn timed(name: &str, duration_ms: u64) -> MediaItem {
        MediaItem::new(name).with_duration_ms(duration_ms)
    }

    fn members(group: &MatchGroup) -> Vec<(String, String)> {
        group
            .members
            .iter()
            .map(|m| (m.subgroup_tag.clone(), m.path.display().to_string()))
            .collect()
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(t, p)| (t.to_string(), p.to_string())).collect()
    }

    #[test]
    fn exact_chapter_match_commits_pair() {
        let a = vec![chaptered("old/ep01.mkv", &[0, 60_000, 120_000])];
        let b = vec![chaptered("new/ep01.mkv", &[0, 60_000, 120_000])];

        let outcome = Matcher::default().run(&a, &b);

        assert_eq!(outcome.plan.groups().len(), 1);
        let group = &outcome.plan.groups()[0];
        assert_eq!(group.group_id, "001");
        assert_eq!(members(group), pairs(&[("1", "old/ep01.mkv"), ("2", "new/ep01.mkv")]));
        assert!(group.members.iter().all(|m| m.enabled == EnabledFlag::Unset));
        assert!(outcome.plan.unmatched().members.is_empty());
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn chapter_tolerance_is_applied() {
        let a = vec![chaptered("a.mkv", &[0, 60_000])];
        let b = vec![chaptered("b.mkv", &[0, 60_040])];
        assert_eq!(Matcher::default().run(&a, &b).plan.groups().len(), 1);

        let far = vec![chaptered("b.mkv", &[0, 60_080])];
        let outcome = Matcher::default().run(&a, &far);
        assert!(outcome.plan.groups().is_empty());
        assert_eq!(outcome.events[0].kind, MatchEventKind::NoMatch);
        assert_eq!(outcome.events[0].pass, MatchPass::Chapters);
    }

    #[test]
    fn ambiguous_chapters_claim_nothing() {
        let a = vec![chaptered("a.mkv", &[0, 1000]).with_duration_ms(9000)];
        let b = vec![
            chaptered("b1.mkv", &[0, 1000]).with_duration_ms(9000),
            chaptered("b2.mkv", &[0, 1000]),
        ];

        let outcome = Matcher::default().run(&a, &b);

        assert_eq!(outcome.events[0].kind, MatchEventKind::Ambiguous);
        assert_eq!(outcome.events[0].candidates.len(), 2);
        // Left for the duration pass, which finds a single candidate.
        assert_eq!(outcome.plan.groups().len(), 1);
        assert_eq!(members(&outcome.plan.groups()[0])[1].1, "b1.mkv");
        assert_eq!(outcome.plan.unmatched().members.len(), 1);
    }

    #[test]
    fn menu_duration_collision_becomes_cluster() {
        let a = vec![timed("00_Menu.mkv", 5000)];
        let b = vec![timed("00_Menu_a.mkv", 5000), timed("00_Menu_b.mkv", 5000)];

        let outcome = Matcher::default().run(&a, &b);

        assert_eq!(outcome.plan.groups().len(), 1);
        assert_eq!(
            members(&outcome.plan.groups()[0]),
            pairs(&[
                ("1", "00_Menu.mkv"),
                ("2.1", "00_Menu_a.mkv"),
                ("2.2", "00_Menu_b.mkv")
            ])
        );
        assert!(outcome.events.is_empty());
        assert!(outcome.plan.unmatched().members.is_empty());
    }

    #[test]
    fn reverse_menu_cluster_keeps_new_file_as_source() {
        let a = vec![timed("old/Menu_1.mkv", 5000), timed("old/Menu_2.mkv", 5000)];
        let b = vec![timed("new/Menu_3.mkv", 5000), timed("new/ep.mkv", 5000)];

        let outcome = Matcher::default().run(&a, &b);

        // Forward: each old menu also sees ep.mkv, so no cluster.
        assert_eq!(outcome.events.len(), 2);
        assert!(outcome.events.iter().all(|e| e.kind == MatchEventKind::Ambiguous));

        let group = &outcome.plan.groups()[0];
        assert_eq!(
            members(group),
            pairs(&[
                ("2", "new/Menu_3.mkv"),
                ("1.1", "old/Menu_1.mkv"),
                ("1.2", "old/Menu_2.mkv")
            ])
        );

        let sides = group.sides();
        assert_eq!(sides[0].tag, "2");
        assert!(sides[1..]
            .iter()
            .flat_map(|s| s.paths())
            .all(|p| p.starts_with("old")));
        assert_eq!(
            outcome.plan.unmatched().members[0].path,
            PathBuf::from("new/ep.mkv")
        );
    }

    #[test]
    fn non_menu_duration_collision_is_ambiguous() {
        let a = vec![timed("ep01.mkv", 5000), timed("ep02.mkv", 5020)];
        let b = vec![timed("ep01.mkv", 5000), timed("ep02.mkv", 5050)];

        let outcome = Matcher::default().run(&a, &b);

        assert!(outcome.plan.groups().is_empty());
        assert_eq!(outcome.plan.unmatched().members.len(), 4);
        assert_eq!(outcome.events.len(), 4);
        assert!(outcome
            .events
            .iter()
            .all(|e| e.kind == MatchEventKind::Ambiguous && e.pass == MatchPass::Duration));
    }

    #[test]
    fn forward_duration_pass_consumes_single_candidate() {
        let a = vec![timed("x1.mkv", 5000), timed("x2.mkv", 5000)];
        let b = vec![timed("y.mkv", 5000)];

        let outcome = Matcher::default().run(&a, &b);

        // x1 sees one candidate and claims y before x2 is considered.
        assert_eq!(outcome.plan.groups().len(), 1);
        assert_eq!(
            members(&outcome.plan.groups()[0]),
            pairs(&[("1", "x1.mkv"), ("2", "y.mkv")])
        );
        assert_eq!(outcome.plan.unmatched().members[0].path, PathBuf::from("x2.mkv"));
    }

    #[test]
    fn reverse_duration_pass_resolves_when_forward_is_ambiguous() {
        let a = vec![timed("x.mkv", 5000)];
        let b = vec![timed("y1.mkv", 5000), timed("y2.mkv", 5000)];

        let outcome = Matcher::default().run(&a, &b);

        // Forward is ambiguous; reverse lets y1 claim x, A members first.
        assert_eq!(
            members(&outcome.plan.groups()[0]),
            pairs(&[("1", "x.mkv"), ("2", "y1.mkv")])
        );
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.plan.unmatched().members.len(), 1);
    }

    #[test]
    fn slicing_is_all_or_nothing() {
        let a = vec![chaptered("movie.mkv", &[0, 30_000, 75_000]).with_duration_ms(75_000)];
        let b = vec![timed("part1.mkv", 30_000)];

        let outcome = Matcher::default().run(&a, &b);

        assert!(outcome.plan.groups().is_empty());
        assert_eq!(outcome.plan.unmatched().members.len(), 2);
    }

    #[test]
    fn slicing_claims_clips_in_interval_order() {
        let a = vec![chaptered("movie.mkv", &[0, 30_000]).with_duration_ms(75_000)];
        let b = vec![timed("part2.mkv", 45_000), timed("part1.mkv", 30_050)];

        let outcome = Matcher::default().run(&a, &b);

        assert_eq!(outcome.plan.groups().len(), 1);
        assert_eq!(
            members(&outcome.plan.groups()[0]),
            pairs(&[("1", "movie.mkv"), ("2", "part1.mkv"), ("2", "part2.mkv")])
        );
    }

    #[test]
    fn slicing_runs_from_new_side_too() {
        let a = vec![timed("p1.mkv", 20_000), timed("p2.mkv", 20_000)];
        let b = vec![chaptered("whole.mkv", &[0, 20_000, 40_000])];

        let outcome = Matcher::default().run(&a, &b);

        let group = &outcome.plan.groups()[0];
        assert_eq!(
            members(group),
            pairs(&[("1", "p1.mkv"), ("1", "p2.mkv"), ("2", "whole.mkv")])
        );
    }

    #[test]
    fn fingerprint_pass_pairs_matching_audio() {
        let fp = "9000,1,2,3,4,5,6,7";
        let a = vec![MediaItem::new("a.mkv").with_fingerprint(fp)];
        let b = vec![
            MediaItem::new("b1.mkv").with_fingerprint("8000,1,2,3,4,5,6,7"),
            MediaItem::new("b2.mkv").with_fingerprint(fp),
        ];

        let config = MatcherConfig {
            use_fingerprints: true,
            ..Default::default()
        };
        let outcome = Matcher::new(config).run(&a, &b);
        assert_eq!(
            members(&outcome.plan.groups()[0]),
            pairs(&[("1", "a.mkv"), ("2", "b2.mkv")])
        );

        // Disabled by default.
        let outcome = Matcher::default().run(&a, &b);
        assert!(outcome.plan.groups().is_empty());
    }

    #[test]
    fn earlier_pass_claims_are_final() {
        let a = vec![chaptered("a.mkv", &[0, 5000]).with_duration_ms(10_000)];
        let b = vec![
            chaptered("b1.mkv", &[0, 5000]).with_duration_ms(50_000),
            timed("b2.mkv", 10_000),
        ];

        let outcome = Matcher::default().run(&a, &b);

        assert_eq!(members(&outcome.plan.groups()[0])[1].1, "b1.mkv");
        assert_eq!(outcome.plan.groups().len(), 1);
        assert_eq!(outcome.plan.unmatched().members[0].path, PathBuf::from("b2.mkv"));
    }

    #[test]
    fn empty_counterpart_puts_everything_in_bucket() {
        let a = vec![
            chaptered("a.mkv", &[0, 1000]),
            timed("b.mkv", 5000),
        ];

        let outcome = Matcher::default().run(&a, &[]);

        assert!(outcome.plan.groups().is_empty());
        assert!(outcome.events.is_empty());
        let bucket = &outcome.plan.unmatched().members;
        assert_eq!(bucket.len(), 2);
        assert!(bucket.iter().all(|m| m.subgroup_tag.is_empty()));

        let both_empty = Matcher::default().run(&[], &[]);
        assert_eq!(both_empty.plan.item_count(), 0);
    }

    fn mixed_inputs() -> (Vec<MediaItem>, Vec<MediaItem>) {
        let a = vec![
            chaptered("a/ep01.mkv", &[0, 60_000]).with_duration_ms(1_400_000),
            timed("a/ep02.mkv", 1_420_000),
            timed("a/00_Menu.mkv", 5000),
            chaptered("a/movie.mkv", &[0, 30_000]).with_duration_ms(60_000),
            MediaItem::unprobed("a/broken.mkv"),
            timed("a/extra.mkv", 777),
        ];
        let b = vec![
            chaptered("b/ep01.mkv", &[0, 60_010]).with_duration_ms(1_400_500),
            timed("b/ep02.mkv", 1_420_030),
            timed("b/00_Menu_1.mkv", 5000),
            timed("b/00_Menu_2.mkv", 5000),
            timed("b/m1.mkv", 30_000),
            timed("b/m2.mkv", 30_000),
            timed("b/lonely.mkv", 99_999),
        ];
        (a, b)
    }

    #[test]
    fn every_item_is_accounted_for_once() {
        let (a, b) = mixed_inputs();
        let outcome = Matcher::default().run(&a, &b);

        assert_eq!(outcome.plan.item_count(), a.len() + b.len());

        let mut seen: Vec<PathBuf> = outcome
            .plan
            .all_paths()
            .into_iter()
            .map(|p| p.to_path_buf())
            .collect();
        seen.sort();
        let mut expected: Vec<PathBuf> = a.iter().chain(&b).map(|i| i.path.clone()).collect();
        expected.sort();
        assert_eq!(seen, expected);

        // ep01, ep02, menu cluster, movie slices
        assert_eq!(outcome.plan.groups().len(), 4);
        let ids: Vec<&str> = outcome.plan.groups().iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["001", "002", "003", "004"]);
    }

    #[test]
    fn rematch_is_identical() {
        let (a, b) = mixed_inputs();
        let matcher = Matcher::default();
        assert_eq!(matcher.run(&a, &b), matcher.run(&a, &b));
    }

    #[test]
    fn events_render_for_logs() {
        let event = MatchEvent {
            pass: MatchPass::Duration,
            kind: MatchEventKind::Ambiguous,
            item: PathBuf::from("a.mkv"),
            candidates: vec![PathBuf::from("b.mkv"), PathBuf::from("c.mkv")],
        };
        assert_eq!(event.to_string(), "duration pass: 2 candidates for a.mkv: b.mkv c.mkv");
    }
}
