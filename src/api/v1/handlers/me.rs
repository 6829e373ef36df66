/*
 * Responsibility
 * - GET /me: verified claims of the caller
 * - GET /me/claims/{name}: one claim, 404 when absent
 */
use axum::{Json, extract::Path};
use serde_json::Value;

use crate::api::v1::extractors::Claims;
use crate::error::AppError;

pub async fn me(claims: Claims) -> Json<Claims> {
    Json(claims)
}

pub async fn claim(claims: Claims, Path(name): Path<String>) -> Result<Json<Value>, AppError> {
    claims
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("claim '{name}'")))
}
