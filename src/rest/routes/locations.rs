use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal_error, not_found, unprocessable};
use crate::status;
use crate::storage::LocationRow;
use crate::AppContext;

fn location_json(l: &LocationRow) -> Value {
    json!({
        "id": l.id,
        "name": l.name,
        "description": l.description,
        "kind": l.kind,
        "lat": l.lat,
        "lng": l.lng,
        "floor": l.floor,
        "created_at": l.created_at,
    })
}

#[derive(Deserialize)]
pub struct ListLocationsQuery {
    pub kind: Option<String>,
}

pub async fn list_locations(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListLocationsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(kind) = &query.kind {
        if !super::valid_location_kind(kind) {
            return Err(unprocessable("kind must be 'toilet' or 'nursing_room'"));
        }
    }

    let locations = ctx
        .storage
        .list_locations(query.kind.as_deref())
        .await
        .map_err(internal_error)?;

    let list: Vec<Value> = locations.iter().map(location_json).collect();
    Ok(Json(json!({ "locations": list })))
}

pub async fn get_location(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Some(location) = ctx.storage.get_location(&id).await.map_err(internal_error)? else {
        return Err(not_found("location"));
    };

    let cutoff = Utc::now() - Duration::hours(i64::from(ctx.config.report_window_hours));
    let kinds = ctx
        .storage
        .recent_report_kinds(&id, &cutoff)
        .await
        .map_err(internal_error)?;
    let status = status::summarize(&kinds);

    let reviews = ctx
        .storage
        .review_summary(&id)
        .await
        .map_err(internal_error)?;

    let mut body = location_json(&location);
    body["status"] = json!({
        "current": status.status,
        "counts": status.counts,
        "report_count": status.report_count,
        "window_hours": ctx.config.report_window_hours,
    });
    body["reviews"] = json!({
        "count": reviews.count,
        "mean_rating": reviews.mean_rating,
    });
    Ok(Json(body))
}
