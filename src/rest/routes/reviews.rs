use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal_error, not_found, unprocessable};
use crate::rest::auth::require_moderator;
use crate::storage::ReviewRow;
use crate::AppContext;

fn review_json(r: &ReviewRow) -> Value {
    json!({
        "id": r.id,
        "user_id": r.user_id,
        "location_id": r.location_id,
        "rating": r.rating,
        "content": r.content,
        "status": r.status,
        "created_at": r.created_at,
    })
}

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub user_id: String,
    pub rating: i64,
    #[serde(default)]
    pub content: String,
}

/// New reviews land as `pending` and only appear publicly once approved.
pub async fn create_review(
    State(ctx): State<Arc<AppContext>>,
    Path(location_id): Path<String>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !(1..=5).contains(&body.rating) {
        return Err(unprocessable("rating must be between 1 and 5"));
    }
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

    let review = ctx
        .storage
        .create_review(&body.user_id, &location_id, body.rating, &body.content)
        .await
        .map_err(internal_error)?;
    Ok(Json(review_json(&review)))
}

/// Approved reviews for a location, newest first.
pub async fn list_reviews(
    State(ctx): State<Arc<AppContext>>,
    Path(location_id): Path<String>,
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

    let reviews = ctx
        .storage
        .list_approved_reviews(&location_id)
        .await
        .map_err(internal_error)?;
    let list: Vec<Value> = reviews.iter().map(review_json).collect();
    Ok(Json(json!({ "reviews": list })))
}

pub async fn approve_review(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    moderate_review(&ctx, &id, &headers, "approved").await
}

pub async fn reject_review(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    moderate_review(&ctx, &id, &headers, "rejected").await
}

async fn moderate_review(
    ctx: &AppContext,
    id: &str,
    headers: &HeaderMap,
    status: &str,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_moderator(ctx, headers)?;

    let changed = ctx
        .storage
        .set_review_status(id, status)
        .await
        .map_err(internal_error)?;
    if !changed {
        return Err(not_found("pending review"));
    }
    Ok(Json(json!({ "id": id, "status": status })))
}
