use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal_error, unprocessable};
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub display_name: String,
}

pub async fn create_user(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let display_name = body.display_name.trim();
    if display_name.is_empty() {
        return Err(unprocessable("display_name must not be empty"));
    }

    let user = ctx
        .storage
        .create_user(display_name)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "id": user.id,
        "display_name": user.display_name,
        "created_at": user.created_at,
    })))
}
