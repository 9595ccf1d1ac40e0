//! Streak and daily-frequency calculators.
//!
//! Both are stateless over the full check-in history: every call reduces raw
//! UTC instants to calendar days under the configured offset and recomputes
//! from scratch.  Backfilled check-ins therefore behave exactly like
//! real-time ones.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use std::collections::HashMap;

/// Derived streak figures for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StreakSummary {
    /// Longest run of consecutive check-in days anywhere in the history.
    pub max_streak: u32,
    /// Length of the most recent run (the one containing the last check-in
    /// day, whether or not it is still alive today).
    pub current_streak: u32,
    /// Completed 7-day windows summed across all runs: a 14-day run counts
    /// twice, a 9-day run once with the 2-day remainder dropped.
    pub weekly_streaks: u32,
}

/// Reduce timestamps to distinct local calendar days, sorted ascending.
fn distinct_days(times: &[DateTime<Utc>], offset: FixedOffset) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = times
        .iter()
        .map(|t| t.with_timezone(&offset).date_naive())
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Walk the distinct check-in days and derive streak figures.
///
/// Multiple check-ins on the same calendar day collapse to a single day
/// before the walk, so they contribute exactly one day to any streak.
pub fn streak_summary(times: &[DateTime<Utc>], offset: FixedOffset) -> StreakSummary {
    let mut summary = StreakSummary::default();
    let mut run: u32 = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in distinct_days(times, offset) {
        match prev {
            Some(p) if day - p == Duration::days(1) => run += 1,
            _ => {
                // Run broken (or first day): bank completed 7-day windows.
                summary.weekly_streaks += run / 7;
                run = 1;
            }
        }
        summary.max_streak = summary.max_streak.max(run);
        prev = Some(day);
    }
    summary.weekly_streaks += run / 7;
    summary.current_streak = run;
    summary
}

/// Maximum number of check-ins sharing one calendar day (0 for no history).
pub fn max_daily_check_ins(times: &[DateTime<Utc>], offset: FixedOffset) -> u32 {
    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
    for t in times {
        *counts
            .entry(t.with_timezone(&offset).date_naive())
            .or_insert(0) += 1;
    }
    counts.values().copied().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    /// Day `n` at the given hour, counted from an arbitrary fixed origin.
    fn day(n: i64, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 30, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(streak_summary(&[], utc()), StreakSummary::default());
        assert_eq!(max_daily_check_ins(&[], utc()), 0);
    }

    #[test]
    fn same_day_repeats_count_as_one_day() {
        let times = vec![day(0, 8), day(0, 12), day(0, 22)];
        let s = streak_summary(&times, utc());
        assert_eq!(s.max_streak, 1);
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.weekly_streaks, 0);
        assert_eq!(max_daily_check_ins(&times, utc()), 3);
    }

    #[test]
    fn seven_consecutive_days_complete_one_window() {
        let times: Vec<_> = (0..7).map(|n| day(n, 9)).collect();
        let s = streak_summary(&times, utc());
        assert_eq!(s.max_streak, 7);
        assert_eq!(s.current_streak, 7);
        assert_eq!(s.weekly_streaks, 1);
    }

    #[test]
    fn nine_consecutive_days_drop_the_remainder() {
        let times: Vec<_> = (0..9).map(|n| day(n, 9)).collect();
        let s = streak_summary(&times, utc());
        assert_eq!(s.max_streak, 9);
        assert_eq!(s.weekly_streaks, 1);
    }

    #[test]
    fn fourteen_consecutive_days_complete_two_windows() {
        let times: Vec<_> = (0..14).map(|n| day(n, 9)).collect();
        let s = streak_summary(&times, utc());
        assert_eq!(s.weekly_streaks, 2);
        assert_eq!(s.max_streak, 14);
    }

    #[test]
    fn gap_splits_runs_and_current_tracks_the_last() {
        // 7-day run, a gap, then a 3-day run.
        let times: Vec<_> = (0..7).chain(9..12).map(|n| day(n, 9)).collect();
        let s = streak_summary(&times, utc());
        assert_eq!(s.max_streak, 7);
        assert_eq!(s.current_streak, 3);
        assert_eq!(s.weekly_streaks, 1);
    }

    #[test]
    fn trailing_single_day_after_gap() {
        // Days D..=D+6 then D+8: the week survives, the tail restarts at 1.
        let times: Vec<_> = (0..7).chain(std::iter::once(8)).map(|n| day(n, 9)).collect();
        let s = streak_summary(&times, utc());
        assert_eq!(s.max_streak, 7);
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.weekly_streaks, 1);
    }

    #[test]
    fn unsorted_input_is_handled() {
        let times = vec![day(2, 9), day(0, 9), day(1, 9)];
        let s = streak_summary(&times, utc());
        assert_eq!(s.max_streak, 3);
        assert_eq!(s.current_streak, 3);
    }

    #[test]
    fn offset_moves_the_day_boundary() {
        // 23:30 UTC on day 0 and 01:30 UTC on day 1 are the same local day
        // at UTC+8, so they dedup to one streak day.
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let times = vec![
            Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 2, 1, 30, 0).unwrap(),
        ];
        let s = streak_summary(&times, tz);
        assert_eq!(s.max_streak, 1);
        assert_eq!(max_daily_check_ins(&times, tz), 2);
    }

    proptest! {
        /// Streak figures never exceed the number of distinct days, and
        /// duplicating timestamps changes nothing.
        #[test]
        fn bounded_by_distinct_days(offsets in prop::collection::vec(0i64..120, 0..40)) {
            let times: Vec<_> = offsets.iter().map(|&n| day(n, 10)).collect();
            let distinct = distinct_days(&times, utc()).len() as u32;

            let s = streak_summary(&times, utc());
            prop_assert!(s.max_streak <= distinct);
            prop_assert!(s.current_streak <= s.max_streak);
            prop_assert!(s.weekly_streaks <= distinct / 7);

            let mut doubled = times.clone();
            doubled.extend_from_slice(&times);
            prop_assert_eq!(streak_summary(&doubled, utc()), s);
        }
    }
}
