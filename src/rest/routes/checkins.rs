use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal_error, not_found};
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateCheckInRequest {
    pub user_id: String,
}

/// Record a timestamped check-in.  Achievements are NOT evaluated here —
/// unlocks happen lazily on the next profile read.
pub async fn create_check_in(
    State(ctx): State<Arc<AppContext>>,
    Path(location_id): Path<String>,
    Json(body): Json<CreateCheckInRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if ctx
        .storage
        .get_location(&location_id)
        .await
        .map_err(internal_error)?
        .is_none()
    {
        return Err(not_found("location"));
    }
    if ctx
        .storage
        .get_user(&body.user_id)
        .await
        .map_err(internal_error)?
        .is_none()
    {
        return Err(not_found("user"));
    }

    let check_in = ctx
        .storage
        .create_check_in(&body.user_id, &location_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "id": check_in.id,
        "user_id": check_in.user_id,
        "location_id": check_in.location_id,
        "created_at": check_in.created_at,
    })))
}
