//! Built-in achievement definitions and the idempotent seed operation.
//!
//! Definitions are static at runtime; `seed` is the only write path into the
//! `achievements` table and may be re-run freely (upsert by id).

use anyhow::Result;
use tracing::info;

use crate::achievements::CriteriaType;
use crate::storage::Storage;

pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub criteria: CriteriaType,
    pub threshold: i64,
}

pub fn builtin() -> Vec<AchievementDef> {
    vec![
        AchievementDef {
            id: "first-review",
            name: "First Impressions",
            description: "Write your first review",
            icon: "pencil",
            criteria: CriteriaType::ReviewCount,
            threshold: 1,
        },
        AchievementDef {
            id: "seasoned-critic",
            name: "Seasoned Critic",
            description: "Write ten reviews",
            icon: "star",
            criteria: CriteriaType::ReviewCount,
            threshold: 10,
        },
        AchievementDef {
            id: "first-report",
            name: "Eyes Open",
            description: "File your first issue report",
            icon: "flag",
            criteria: CriteriaType::ReportCount,
            threshold: 1,
        },
        AchievementDef {
            id: "facility-watchdog",
            name: "Facility Watchdog",
            description: "File five issue reports",
            icon: "shield",
            criteria: CriteriaType::ReportCount,
            threshold: 5,
        },
        AchievementDef {
            id: "trailblazer",
            name: "Trailblazer",
            description: "Get a facility request approved",
            icon: "map-pin",
            criteria: CriteriaType::RequestCount,
            threshold: 1,
        },
        AchievementDef {
            id: "week-regular",
            name: "Week Regular",
            description: "Check in seven days in a row",
            icon: "calendar",
            criteria: CriteriaType::WeeklyStreaks,
            threshold: 1,
        },
        AchievementDef {
            id: "thirty-days",
            name: "Thirty Days Strong",
            description: "Keep a thirty-day check-in streak",
            icon: "trophy",
            criteria: CriteriaType::MaxStreakDays,
            threshold: 30,
        },
        AchievementDef {
            id: "frequent-visitor",
            name: "Frequent Visitor",
            description: "Check in five times in one day",
            icon: "clock",
            criteria: CriteriaType::MaxDailyCheckIns,
            threshold: 5,
        },
    ]
}

/// Upsert all built-in definitions.  Returns how many were written.
pub async fn seed(storage: &Storage) -> Result<usize> {
    let defs = builtin();
    for def in &defs {
        storage
            .upsert_achievement(
                def.id,
                def.name,
                def.description,
                def.icon,
                def.criteria.as_str(),
                def.threshold,
            )
            .await?;
    }
    info!(count = defs.len(), "achievement definitions seeded");
    Ok(defs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let defs = builtin();
        let mut ids: Vec<_> = defs.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
    }

    #[test]
    fn thresholds_are_positive() {
        assert!(builtin().iter().all(|d| d.threshold > 0));
    }
}
