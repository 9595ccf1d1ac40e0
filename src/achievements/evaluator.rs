//! Achievement evaluator.
//!
//! Resolves each definition's criteria against the user's current activity,
//! persists any newly crossed unlock (idempotently), and returns the
//! annotated list for the profile view.  This is the engine's only write
//! path, and it runs inside a read.

use anyhow::Result;
use chrono::{FixedOffset, Utc};
use std::collections::HashMap;
use tracing::warn;

use crate::achievements::streak::{max_daily_check_ins, streak_summary, StreakSummary};
use crate::achievements::CriteriaType;
use crate::storage::Storage;

/// One evaluated achievement, ready for the presentation layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AchievementView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub criteria_type: CriteriaType,
    pub threshold: i64,
    /// The computed value the threshold is compared against.
    pub current: i64,
    /// 0–100; always 100 once unlocked.
    pub progress: i64,
    pub is_unlocked: bool,
    pub unlocked_at: Option<String>,
}

fn progress_pct(current: i64, threshold: i64) -> i64 {
    if threshold <= 0 {
        return 100;
    }
    (current.saturating_mul(100) / threshold).min(100)
}

/// Evaluate every stored achievement definition for `user_id`.
///
/// An empty definition list yields an empty result.  Unlock rows are written
/// at most once per (user, achievement); a lost race or a failed write still
/// reports the computed unlocked state, and the next read retries the write.
pub async fn evaluate(
    storage: &Storage,
    user_id: &str,
    offset: FixedOffset,
) -> Result<Vec<AchievementView>> {
    let defs = storage.list_achievements().await?;
    if defs.is_empty() {
        return Ok(Vec::new());
    }

    let mut parsed = Vec::with_capacity(defs.len());
    for def in defs {
        match def.criteria_type.parse::<CriteriaType>() {
            Ok(criteria) => parsed.push((def, criteria)),
            // Tolerate a stray definition rather than failing the profile.
            Err(e) => warn!(achievement = %def.id, %e, "skipping achievement definition"),
        }
    }

    let counts = storage.activity_counts(user_id).await?;

    // Check-in history is only loaded when some definition needs it.
    let (streaks, daily_max) = if parsed.iter().any(|(_, c)| c.needs_check_ins()) {
        let times = storage.check_in_times(user_id).await?;
        (
            streak_summary(&times, offset),
            max_daily_check_ins(&times, offset),
        )
    } else {
        (StreakSummary::default(), 0)
    };

    let existing: HashMap<String, String> = storage
        .list_unlocks(user_id)
        .await?
        .into_iter()
        .map(|u| (u.achievement_id, u.unlocked_at))
        .collect();

    let mut views = Vec::with_capacity(parsed.len());
    for (def, criteria) in parsed {
        let current = match criteria {
            CriteriaType::ReviewCount => counts.reviews,
            CriteriaType::ReportCount => counts.reports,
            CriteriaType::RequestCount => counts.approved_requests,
            CriteriaType::WeeklyStreaks => i64::from(streaks.weekly_streaks),
            CriteriaType::MaxStreakDays => i64::from(streaks.max_streak),
            CriteriaType::MaxDailyCheckIns => i64::from(daily_max),
        };

        let mut unlocked_at = existing.get(&def.id).cloned();
        let mut is_unlocked = unlocked_at.is_some();

        if !is_unlocked && current >= def.threshold {
            let now = Utc::now().to_rfc3339();
            if let Err(e) = storage.insert_unlock(user_id, &def.id, &now).await {
                // The read stays correct; the row is written on the next
                // evaluation instead.
                warn!(user = %user_id, achievement = %def.id, %e, "unlock write failed");
            }
            unlocked_at = Some(now);
            is_unlocked = true;
        }

        let progress = if is_unlocked {
            100
        } else {
            progress_pct(current, def.threshold)
        };

        views.push(AchievementView {
            id: def.id,
            name: def.name,
            description: def.description,
            icon: def.icon,
            criteria_type: criteria,
            threshold: def.threshold,
            current,
            progress,
            is_unlocked,
            unlocked_at,
        });
    }

    // Unlocked first, then easiest-first within each group.
    views.sort_by(|a, b| {
        b.is_unlocked
            .cmp(&a.is_unlocked)
            .then(a.threshold.cmp(&b.threshold))
    });
    Ok(views)
}
