pub mod checkins;
pub mod health;
pub mod locations;
pub mod profile;
pub mod reports;
pub mod requests;
pub mod reviews;
pub mod users;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Facility kinds accepted for locations and facility requests.
pub(crate) fn valid_location_kind(kind: &str) -> bool {
    matches!(kind, "toilet" | "nursing_room")
}

pub(crate) fn internal_error(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

pub(crate) fn not_found(what: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{what} not found") })),
    )
}

pub(crate) fn unprocessable(msg: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": msg })),
    )
}
