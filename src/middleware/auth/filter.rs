//! The bearer authentication filter itself.
//!
//! Per request:
//! - skip requested by the route → pass through untouched
//! - resolve verifier / error handler
//! - extract the bearer credential, verify it
//! - success → `Claims` into request extensions, continue
//! - failure → error handler → 401, pipeline stops

use std::{fmt, sync::Arc};

use axum::{
    Extension, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use super::extract::bearer_credential;
use super::resolve::{FilterDefaults, RouteOverrides, resolve};
use super::respond::{ErrorHandler, unauthorized};
use crate::services::auth::{Verifier, verify_credential};

/// Filter configuration, fixed at construction and shared read-only by all requests.
#[derive(Clone)]
pub struct BearerAuth {
    defaults: FilterDefaults,
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("on_error", &self.defaults.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl BearerAuth {
    pub fn new(on_verifying: impl Verifier) -> Self {
        Self {
            defaults: FilterDefaults {
                verifier: Arc::new(on_verifying),
                error_handler: None,
            },
        }
    }

    /// Replace the default echo error handler.
    pub fn on_error(mut self, handler: impl ErrorHandler) -> Self {
        self.defaults.error_handler = Some(Arc::new(handler));
        self
    }
}

/// Authenticate every route of `router`.
///
/// Layers on individual routes run after this one, so a route-level
/// `Extension(RouteOverrides)` is never seen here. For per-route overrides use
/// [`protect_with`] on that route instead; `apply` only honours overrides put
/// into the request extensions by a layer outside it.
pub fn apply<S>(router: Router<S>, filter: &BearerAuth) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(filter.clone(), bearer_auth))
}

/// Authenticate a single route.
pub fn protect<S>(route: MethodRouter<S>, filter: &BearerAuth) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.layer(middleware::from_fn_with_state(filter.clone(), bearer_auth))
}

/// Authenticate a single route with route-level overrides.
///
/// ```ignore
/// Router::new().route(
///     "/health",
///     protect_with(get(health), &filter, RouteOverrides::skip_auth()),
/// )
/// ```
pub fn protect_with<S>(
    route: MethodRouter<S>,
    filter: &BearerAuth,
    overrides: RouteOverrides,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Layers added later run first, so the extension is visible to the filter.
    protect(route, filter).layer(Extension(overrides))
}

async fn bearer_auth(
    State(filter): State<BearerAuth>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if req
        .extensions()
        .get::<RouteOverrides>()
        .is_some_and(RouteOverrides::is_skip)
    {
        tracing::debug!(path = %req.uri().path(), "bearer auth skipped by route");
        return next.run(req).await;
    }

    let resolved = resolve(req.extensions_mut(), &filter.defaults);

    let credential = bearer_credential(req.headers());
    let result = verify_credential(resolved.verifier.as_ref(), credential).await;

    match result {
        Ok(claims) => {
            tracing::debug!(sub = ?claims.subject(), "bearer token verified");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => {
            let message = err.to_string();
            tracing::warn!(
                error = %message,
                path = %req.uri().path(),
                "bearer authentication failed"
            );
            let (parts, _body) = req.into_parts();
            unauthorized(resolved.error_handler.as_ref(), &parts, &message)
        }
    }
}
