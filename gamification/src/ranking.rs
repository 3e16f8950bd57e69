//! Leaderboard windows and entries.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use marcha_core::rank::{user_rank, RankInfo};
use marcha_core::UserId;
use serde::Serialize;

/// Windowed leaderboards are capped at this many entries.
pub const RANKING_LIMIT: usize = 50;

/// The four leaderboard windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankingPeriod {
    /// ISO week, Monday start, midnight UTC
    Week,
    /// Calendar month from day 1
    Month,
    /// Calendar year from January 1
    Year,
    /// No window
    All,
}

impl RankingPeriod {
    /// String representation, as received from the UI.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    /// Parse a period name; anything unknown means all-time.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::All,
        }
    }

    /// Start of the window containing `now`, `None` for all-time.
    #[must_use]
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let start = match self {
            Self::Week => today.week(Weekday::Mon).first_day(),
            Self::Month => today.with_day(1).unwrap_or(today),
            Self::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
            Self::All => return None,
        };
        Some(start.and_time(NaiveTime::MIN).and_utc())
    }
}

impl std::fmt::Display for RankingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    /// The ranked user
    pub user_id: UserId,
    /// Display name at hydration time
    pub name: String,
    /// Points in the window (all-time total for [`RankingPeriod::All`])
    pub points: i64,
    /// Rank label for the user's all-time total
    pub rank: &'static RankInfo,
}

impl RankingEntry {
    /// Builds a row, deriving the rank label from `total_points` (the
    /// all-time total, which may exceed the windowed `points`).
    #[must_use]
    pub fn new(user_id: UserId, name: String, points: i64, total_points: i64) -> Self {
        Self {
            user_id,
            name,
            points,
            rank: user_rank(total_points),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn period_parse_defaults_to_all() {
        assert_eq!(RankingPeriod::parse("week"), RankingPeriod::Week);
        assert_eq!(RankingPeriod::parse("fortnight"), RankingPeriod::All);
    }

    #[test]
    fn week_window_starts_monday() {
        // 2026-08-29 is a Saturday; the ISO week began Monday the 24th.
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 15, 30, 0).unwrap();
        let start = RankingPeriod::Week.window_start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 24, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_window_starts_day_one() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 15, 30, 0).unwrap();
        let start = RankingPeriod::Month.window_start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn year_window_starts_january_first() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 15, 30, 0).unwrap();
        let start = RankingPeriod::Year.window_start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn all_time_has_no_window() {
        assert_eq!(RankingPeriod::All.window_start(Utc::now()), None);
    }
}
