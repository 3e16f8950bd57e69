//! Rank thresholds and rank progress math.
//!
//! A user's rank is the highest-threshold entry whose `min_points` does not
//! exceed the user's denormalized point total. The threshold table is a
//! static constant shared by ranking and rank-display logic; changing it
//! changes historical rank labels for the same totals, which is accepted as
//! a display-only concern.

use serde::Serialize;

/// One rank threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RankInfo {
    /// Display name
    pub name: &'static str,
    /// Minimum point total for this rank (inclusive)
    pub min_points: i64,
    /// Display color (hex)
    pub color: &'static str,
    /// Display icon name
    pub icon: &'static str,
}

/// The rank ladder, strictly increasing by `min_points`, starting at 0.
pub const RANKS: &[RankInfo] = &[
    RankInfo {
        name: "Novato",
        min_points: 0,
        color: "#9e9e9e",
        icon: "sprout",
    },
    RankInfo {
        name: "Aprendiz",
        min_points: 101,
        color: "#8d6e63",
        icon: "wrench",
    },
    RankInfo {
        name: "Conductor",
        min_points: 251,
        color: "#42a5f5",
        icon: "steering-wheel",
    },
    RankInfo {
        name: "Profesional",
        min_points: 501,
        color: "#66bb6a",
        icon: "badge",
    },
    RankInfo {
        name: "Experto",
        min_points: 1001,
        color: "#ab47bc",
        icon: "medal",
    },
    RankInfo {
        name: "Maestro",
        min_points: 2001,
        color: "#ffa726",
        icon: "trophy",
    },
    RankInfo {
        name: "Leyenda",
        min_points: 5001,
        color: "#ef5350",
        icon: "crown",
    },
];

/// Progress towards the next rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RankProgress<'a> {
    /// Linear progress between the current and next threshold, 0–100
    pub progress: u8,
    /// The next rank, `None` when already at the top
    pub next_rank: Option<&'a RankInfo>,
    /// Points still needed to reach the next rank, 0 at the top
    pub points_to_next: i64,
}

/// Returns the highest-threshold rank in `ranks` whose `min_points` is at
/// most `points`.
///
/// Negative totals (possible only through manual adjustments) clamp to the
/// lowest rank.
///
/// # Panics
///
/// Panics if `ranks` is empty; the table is a non-empty constant.
#[must_use]
pub fn rank_for(ranks: &[RankInfo], points: i64) -> &RankInfo {
    ranks
        .iter()
        .rev()
        .find(|rank| rank.min_points <= points)
        .unwrap_or(&ranks[0])
}

/// Returns the rank for `points` against the static [`RANKS`] ladder.
#[must_use]
pub fn user_rank(points: i64) -> &'static RankInfo {
    rank_for(RANKS, points)
}

/// Computes progress from the current rank towards the next one in `ranks`.
///
/// Progress is the linear interpolation of `points` between the current and
/// next thresholds, clamped to `[0, 100]`. At the top rank `next_rank` is
/// `None` and progress is 100.
#[must_use]
pub fn progress_in<'a>(ranks: &'a [RankInfo], points: i64) -> RankProgress<'a> {
    let current = rank_for(ranks, points);
    let index = ranks
        .iter()
        .position(|rank| rank.min_points == current.min_points)
        .unwrap_or(0);

    let Some(next) = ranks.get(index + 1) else {
        return RankProgress {
            progress: 100,
            next_rank: None,
            points_to_next: 0,
        };
    };

    let span = next.min_points - current.min_points;
    let into = (points - current.min_points).max(0);
    let ratio = if span <= 0 { 100 } else { into * 100 / span };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let progress = ratio.clamp(0, 100) as u8;

    RankProgress {
        progress,
        next_rank: Some(next),
        points_to_next: (next.min_points - points).max(0),
    }
}

/// Progress towards the next rank against the static [`RANKS`] ladder.
#[must_use]
pub fn next_rank_progress(points: i64) -> RankProgress<'static> {
    progress_in(RANKS, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TWO_RANKS: &[RankInfo] = &[
        RankInfo {
            name: "Novato",
            min_points: 0,
            color: "#9e9e9e",
            icon: "sprout",
        },
        RankInfo {
            name: "Profesional",
            min_points: 501,
            color: "#66bb6a",
            icon: "badge",
        },
    ];

    #[test]
    fn threshold_boundary() {
        assert_eq!(rank_for(TWO_RANKS, 500).name, "Novato");
        assert_eq!(rank_for(TWO_RANKS, 501).name, "Profesional");
    }

    #[test]
    fn zero_points_is_lowest_rank() {
        assert_eq!(user_rank(0).min_points, 0);
    }

    #[test]
    fn huge_totals_hit_top_rank() {
        assert_eq!(user_rank(i64::MAX).name, "Leyenda");
    }

    #[test]
    fn ladder_is_strictly_increasing() {
        for window in RANKS.windows(2) {
            assert!(window[0].min_points < window[1].min_points);
        }
        assert_eq!(RANKS[0].min_points, 0);
    }

    #[test]
    fn top_rank_progress_is_complete() {
        let progress = next_rank_progress(10_000);
        assert_eq!(progress.progress, 100);
        assert!(progress.next_rank.is_none());
        assert_eq!(progress.points_to_next, 0);
    }

    #[test]
    fn midpoint_progress() {
        // Novato (0) -> Aprendiz (101): 50 points is ~49%.
        let progress = next_rank_progress(50);
        assert_eq!(progress.progress, 49);
        assert_eq!(progress.next_rank.map(|rank| rank.name), Some("Aprendiz"));
        assert_eq!(progress.points_to_next, 51);
    }

    proptest! {
        // The returned rank's threshold never exceeds the total, and no
        // higher-threshold rank would also fit.
        #[test]
        fn rank_is_highest_fitting_threshold(points in 0i64..1_000_000) {
            let rank = user_rank(points);
            prop_assert!(rank.min_points <= points);
            prop_assert!(!RANKS.iter().any(
                |r| r.min_points > rank.min_points && r.min_points <= points
            ));
        }

        // Progress is always within [0, 100].
        #[test]
        fn progress_is_bounded(points in -1_000i64..10_000_000) {
            let progress = next_rank_progress(points);
            prop_assert!(progress.progress <= 100);
            prop_assert!(progress.points_to_next >= 0);
        }
    }
}
