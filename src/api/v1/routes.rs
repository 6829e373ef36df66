/*
 * Responsibility
 * - URL layout of v1
 * - which routes sit behind the bearer filter, and with which overrides
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    admin::admin,
    health::health,
    me::{claim, me},
};
use crate::middleware::auth::{BearerAuth, RouteOverrides, protect, protect_with};

pub fn routes(filter: &BearerAuth, admin_overrides: RouteOverrides) -> Router {
    Router::new()
        .route(
            "/health",
            protect_with(get(health), filter, RouteOverrides::skip_auth()),
        )
        .route("/me", protect(get(me), filter))
        .route("/me/claims/{name}", protect(get(claim), filter))
        .route("/admin", protect_with(get(admin), filter, admin_overrides))
}
