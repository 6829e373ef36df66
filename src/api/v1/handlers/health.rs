/*
 * Responsibility
 * - GET /health (liveness check)
 * - auth is skipped on this route, so `authenticated` is always false
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::api::v1::extractors::Claims;

pub async fn health(claims: Option<Claims>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "authenticated": claims.is_some()})),
    )
}
