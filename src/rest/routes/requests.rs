use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal_error, not_found, unprocessable, valid_location_kind};
use crate::rest::auth::require_moderator;
use crate::storage::FacilityRequestRow;
use crate::AppContext;

fn request_json(r: &FacilityRequestRow) -> Value {
    json!({
        "id": r.id,
        "user_id": r.user_id,
        "name": r.name,
        "description": r.description,
        "kind": r.kind,
        "lat": r.lat,
        "lng": r.lng,
        "floor": r.floor,
        "status": r.status,
        "created_at": r.created_at,
    })
}

#[derive(Deserialize)]
pub struct CreateRequestBody {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    pub floor: Option<String>,
}

pub async fn create_request(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.name.trim().is_empty() {
        return Err(unprocessable("name must not be empty"));
    }
    if !valid_location_kind(&body.kind) {
        return Err(unprocessable("kind must be 'toilet' or 'nursing_room'"));
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

    let request = ctx
        .storage
        .create_facility_request(
            &body.user_id,
            body.name.trim(),
            &body.description,
            &body.kind,
            body.lat,
            body.lng,
            body.floor.as_deref(),
        )
        .await
        .map_err(internal_error)?;
    Ok(Json(request_json(&request)))
}

#[derive(Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
}

pub async fn list_requests(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListRequestsQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_moderator(&ctx, &headers)?;

    let requests = ctx
        .storage
        .list_facility_requests(query.status.as_deref())
        .await
        .map_err(internal_error)?;
    let list: Vec<Value> = requests.iter().map(request_json).collect();
    Ok(Json(json!({ "requests": list })))
}

/// Approving a request materializes a real location from its fields.
pub async fn approve_request(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_moderator(&ctx, &headers)?;

    let Some(request) = ctx
        .storage
        .get_facility_request(&id)
        .await
        .map_err(internal_error)?
    else {
        return Err(not_found("facility request"));
    };

    let changed = ctx
        .storage
        .set_facility_request_status(&id, "approved")
        .await
        .map_err(internal_error)?;
    if !changed {
        return Err(not_found("pending facility request"));
    }

    let location = ctx
        .storage
        .create_location(
            &request.name,
            &request.description,
            &request.kind,
            request.lat,
            request.lng,
            request.floor.as_deref(),
        )
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "id": id,
        "status": "approved",
        "location_id": location.id,
    })))
}

pub async fn reject_request(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_moderator(&ctx, &headers)?;

    let changed = ctx
        .storage
        .set_facility_request_status(&id, "rejected")
        .await
        .map_err(internal_error)?;
    if !changed {
        return Err(not_found("pending facility request"));
    }
    Ok(Json(json!({ "id": id, "status": "rejected" })))
}
