use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal_error, not_found, unprocessable};
use crate::status::ReportKind;
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateReportRequest {
    pub user_id: String,
    pub kind: String,
    #[serde(default)]
    pub detail: String,
}

pub async fn create_report(
    State(ctx): State<Arc<AppContext>>,
    Path(location_id): Path<String>,
    Json(body): Json<CreateReportRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Ok(kind) = body.kind.parse::<ReportKind>() else {
        return Err(unprocessable(
            "kind must be one of: out_of_order, dirty, no_supplies, crowded, other",
        ));
    };
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

    let report = ctx
        .storage
        .create_report(&body.user_id, &location_id, kind.as_str(), &body.detail)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "id": report.id,
        "user_id": report.user_id,
        "location_id": report.location_id,
        "kind": report.kind,
        "detail": report.detail,
        "created_at": report.created_at,
    })))
}
