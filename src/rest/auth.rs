// rest/auth.rs — Bearer-token check for moderation endpoints.

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use crate::AppContext;

/// Reject the request unless it carries the configured moderation token.
///
/// When no `api_token` is configured the check is disabled (local-only,
/// trusted loopback use) and every caller may moderate.
pub fn require_moderator(
    ctx: &AppContext,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<Value>)> {
    let Some(expected) = ctx.config.api_token.as_deref() else {
        return Ok(());
    };

    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented == Some(expected) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "moderation token required" })),
        ))
    }
}
