//! Comparison predicates and disambiguation strategies used by the passes.

use crate::models::MediaItem;

/// Equal length, and every pair of marks within `tolerance_ms`.
pub fn timestamps_equal(a: &[u64], b: &[u64], tolerance_ms: u64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.abs_diff(*y) <= tolerance_ms)
}

/// Known durations within `tolerance_ms` of each other.
pub fn durations_match(a: u64, b: u64, tolerance_ms: u64) -> bool {
    a > 0 && b > 0 && a.abs_diff(b) <= tolerance_ms
}

/// Menu-screen disambiguation for duration collisions.
///
/// Accepts the set when every file name, the primary's included, contains
/// "menu" (case-insensitive). Menu and index screens often share one
/// duration across releases. Best effort only: any other collision stays
/// ambiguous.
pub fn menu_cluster(primary: &MediaItem, candidates: &[&MediaItem]) -> bool {
    let is_menu = |item: &MediaItem| item.file_name().to_lowercase().contains("menu");
    !candidates.is_empty() && is_menu(primary) && candidates.iter().all(|c| is_menu(c))
}

/// Clip durations implied by a chapter track.
///
/// Consecutive mark differences, then the tail from the last mark to the
/// end when the duration is known and past it. Non-positive intervals are
/// dropped.
pub fn slice_intervals(marks: &[u64], duration_ms: u64) -> Vec<u64> {
    let mut intervals: Vec<u64> = marks
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| w[1] - w[0])
        .collect();

    if let Some(&last) = marks.last() {
        if duration_ms > last {
            intervals.push(duration_ms - last);
        }
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_respect_tolerance() {
        assert!(timestamps_equal(&[0, 60_000], &[0, 60_050], 50));
        assert!(!timestamps_equal(&[0, 60_000], &[0, 60_051], 50));
        assert!(!timestamps_equal(&[0], &[0, 1], 50));
    }

    #[test]
    fn unknown_durations_never_match() {
        assert!(!durations_match(0, 0, 100));
        assert!(!durations_match(0, 50, 100));
        assert!(durations_match(5000, 5100, 100));
    }

    #[test]
    fn menu_cluster_requires_every_name() {
        let primary = MediaItem::new("/a/00_Menu.mkv");
        let a = MediaItem::new("/b/00_MENU_a.mkv");
        let b = MediaItem::new("/b/00_Menu_b.mkv");
        let other = MediaItem::new("/b/NCOP.mkv");

        assert!(menu_cluster(&primary, &[&a, &b]));
        assert!(!menu_cluster(&primary, &[&a, &other]));
        assert!(!menu_cluster(&other, &[&a, &b]));
        assert!(!menu_cluster(&primary, &[]));
    }

    #[test]
    fn intervals_include_tail() {
        assert_eq!(slice_intervals(&[0, 30_000, 75_000], 0), vec![30_000, 45_000]);
        assert_eq!(
            slice_intervals(&[0, 30_000], 75_000),
            vec![30_000, 45_000]
        );
        assert_eq!(slice_intervals(&[0, 30_000], 30_000), vec![30_000]);
    }
}
