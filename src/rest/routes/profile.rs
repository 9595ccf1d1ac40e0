use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal_error, not_found};
use crate::achievements::evaluator;
use crate::achievements::streak::{max_daily_check_ins, streak_summary};
use crate::AppContext;

/// Profile fetch — the lazy-unlock read path.  Evaluating the achievement
/// list here is what persists any newly crossed unlocks.
pub async fn get_profile(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Some(user) = ctx.storage.get_user(&id).await.map_err(internal_error)? else {
        return Err(not_found("user"));
    };

    let offset = ctx.config.utc_offset();
    let counts = ctx
        .storage
        .activity_counts(&id)
        .await
        .map_err(internal_error)?;
    let times = ctx
        .storage
        .check_in_times(&id)
        .await
        .map_err(internal_error)?;
    let streaks = streak_summary(&times, offset);
    let daily_max = max_daily_check_ins(&times, offset);

    let achievements = evaluator::evaluate(&ctx.storage, &id, offset)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "user": {
            "id": user.id,
            "display_name": user.display_name,
            "created_at": user.created_at,
        },
        "activity": {
            "reviews": counts.reviews,
            "reports": counts.reports,
            "approved_requests": counts.approved_requests,
            "check_ins": times.len(),
        },
        "streaks": {
            "max_streak": streaks.max_streak,
            "current_streak": streaks.current_streak,
            "weekly_streaks": streaks.weekly_streaks,
            "max_daily_check_ins": daily_max,
        },
        "achievements": achievements,
    })))
}
