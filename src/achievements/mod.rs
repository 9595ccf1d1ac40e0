//! Achievement engine: activity counters, streak calculators, and the
//! evaluator that turns them into an annotated achievement list.
//!
//! The engine is invoked synchronously from read handlers (profile fetch).
//! Unlocks happen lazily on the first read after a threshold is crossed, so
//! unlock timestamps are next-read-approximate rather than action-time exact.

pub mod evaluator;
pub mod seed;
pub mod streak;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The dimension an achievement's progress is measured against.
///
/// Flat dispatch table — each variant selects one computed value in the
/// evaluator, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaType {
    /// Reviews authored by the user.
    ReviewCount,
    /// Issue reports filed by the user.
    ReportCount,
    /// Facility requests by the user that a moderator approved.
    RequestCount,
    /// Completed 7-day check-in streak windows.
    WeeklyStreaks,
    /// Longest run of consecutive check-in days.
    MaxStreakDays,
    /// Most check-ins recorded on any single calendar day.
    MaxDailyCheckIns,
}

impl CriteriaType {
    pub fn as_str(self) -> &'static str {
        match self {
            CriteriaType::ReviewCount => "review_count",
            CriteriaType::ReportCount => "report_count",
            CriteriaType::RequestCount => "request_count",
            CriteriaType::WeeklyStreaks => "weekly_streaks",
            CriteriaType::MaxStreakDays => "max_streak_days",
            CriteriaType::MaxDailyCheckIns => "max_daily_check_ins",
        }
    }

    /// Whether evaluating this criterion requires the user's check-in history.
    pub fn needs_check_ins(self) -> bool {
        matches!(
            self,
            CriteriaType::WeeklyStreaks
                | CriteriaType::MaxStreakDays
                | CriteriaType::MaxDailyCheckIns
        )
    }
}

#[derive(Debug, Error)]
#[error("unknown criteria type: {0}")]
pub struct UnknownCriteriaType(pub String);

impl FromStr for CriteriaType {
    type Err = UnknownCriteriaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review_count" => Ok(CriteriaType::ReviewCount),
            "report_count" => Ok(CriteriaType::ReportCount),
            "request_count" => Ok(CriteriaType::RequestCount),
            "weekly_streaks" => Ok(CriteriaType::WeeklyStreaks),
            "max_streak_days" => Ok(CriteriaType::MaxStreakDays),
            "max_daily_check_ins" => Ok(CriteriaType::MaxDailyCheckIns),
            other => Err(UnknownCriteriaType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_round_trip() {
        for c in [
            CriteriaType::ReviewCount,
            CriteriaType::ReportCount,
            CriteriaType::RequestCount,
            CriteriaType::WeeklyStreaks,
            CriteriaType::MaxStreakDays,
            CriteriaType::MaxDailyCheckIns,
        ] {
            assert_eq!(c.as_str().parse::<CriteriaType>().unwrap(), c);
        }
    }

    #[test]
    fn unknown_criteria_is_an_error() {
        assert!("mini_game_wins".parse::<CriteriaType>().is_err());
    }

    #[test]
    fn only_streak_family_needs_check_ins() {
        assert!(!CriteriaType::ReviewCount.needs_check_ins());
        assert!(!CriteriaType::ReportCount.needs_check_ins());
        assert!(!CriteriaType::RequestCount.needs_check_ins());
        assert!(CriteriaType::WeeklyStreaks.needs_check_ins());
        assert!(CriteriaType::MaxStreakDays.needs_check_ins());
        assert!(CriteriaType::MaxDailyCheckIns.needs_check_ins());
    }
}
