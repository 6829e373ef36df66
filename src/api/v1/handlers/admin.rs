/*
 * Responsibility
 * - GET /admin
 * - Route-level overrides (JSON error body, admin audience) are wired in routes.rs
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::extractors::Claims;

pub async fn admin(claims: Claims) -> Json<Value> {
    Json(json!({ "admin": claims.subject() }))
}
