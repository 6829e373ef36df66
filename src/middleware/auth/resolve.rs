//! Per-request resolution of the verifier and error handler.
//!
//! Three tiers, first hit wins:
//! 1. [`RouteOverrides`] found in the request extensions
//! 2. the filter's own defaults
//! 3. the built-in [`EchoMessage`] error handler
//!
//! The outcome is stored in the request extensions as [`ResolvedAuth`]. A later
//! resolution on the same request (the filter layered twice) returns the stored
//! value and never replaces it.

use std::{fmt, sync::Arc};

use axum::http::Extensions;

use super::respond::{EchoMessage, ErrorHandler};
use crate::services::auth::Verifier;

/// Per-route settings attached by the host router, e.g. through
/// `axum::Extension(RouteOverrides::skip_auth())`.
#[derive(Clone, Default)]
pub struct RouteOverrides {
    skip: bool,
    on_verifying: Option<Arc<dyn Verifier>>,
    on_error: Option<Arc<dyn ErrorHandler>>,
}

impl fmt::Debug for RouteOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOverrides")
            .field("skip", &self.skip)
            .field("on_verifying", &self.on_verifying.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl RouteOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypass authentication on this route entirely.
    pub fn skip_auth() -> Self {
        Self {
            skip: true,
            ..Self::default()
        }
    }

    pub fn on_verifying(mut self, verifier: impl Verifier) -> Self {
        self.on_verifying = Some(Arc::new(verifier));
        self
    }

    pub fn on_error(mut self, handler: impl ErrorHandler) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn is_skip(&self) -> bool {
        self.skip
    }

    pub fn verifier(&self) -> Option<&Arc<dyn Verifier>> {
        self.on_verifying.as_ref()
    }

    pub fn error_handler(&self) -> Option<&Arc<dyn ErrorHandler>> {
        self.on_error.as_ref()
    }
}

/// Filter-level defaults fixed at construction.
#[derive(Clone)]
pub struct FilterDefaults {
    pub verifier: Arc<dyn Verifier>,
    pub error_handler: Option<Arc<dyn ErrorHandler>>,
}

/// Verifier and error handler in effect for one request.
#[derive(Clone)]
pub struct ResolvedAuth {
    pub verifier: Arc<dyn Verifier>,
    pub error_handler: Arc<dyn ErrorHandler>,
}

impl fmt::Debug for ResolvedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAuth").finish_non_exhaustive()
    }
}

pub fn resolve(extensions: &mut Extensions, defaults: &FilterDefaults) -> ResolvedAuth {
    if let Some(resolved) = extensions.get::<ResolvedAuth>() {
        return resolved.clone();
    }

    let overrides = extensions.get::<RouteOverrides>();

    let verifier = overrides
        .and_then(|o| o.on_verifying.clone())
        .unwrap_or_else(|| defaults.verifier.clone());

    let error_handler = overrides
        .and_then(|o| o.on_error.clone())
        .or_else(|| defaults.error_handler.clone())
        .unwrap_or_else(|| Arc::new(EchoMessage));

    let resolved = ResolvedAuth {
        verifier,
        error_handler,
    };
    extensions.insert(resolved.clone());
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::ErrorBody;
    use crate::services::auth::{Claims, Token, TokenResult, VerifyError, verify_credential};
    use axum::http::{Request, request::Parts};

    fn named(name: &'static str) -> impl Verifier {
        move || -> Result<Token, VerifyError> {
            Ok(Token::new(move |_: &str| -> TokenResult {
                let mut claims = serde_json::Map::new();
                claims.insert("sub".into(), name.into());
                Ok(Claims::new(claims))
            }))
        }
    }

    fn tagged(tag: &'static str) -> impl ErrorHandler {
        move |_: &Parts, message: &str| -> ErrorBody { format!("{tag}:{message}").into() }
    }

    fn parts() -> Parts {
        Request::builder().body(()).unwrap().into_parts().0
    }

    async fn subject(resolved: &ResolvedAuth) -> String {
        let claims = verify_credential(resolved.verifier.as_ref(), Some("t"))
            .await
            .unwrap();
        claims.subject().unwrap().to_string()
    }

    fn body(resolved: &ResolvedAuth) -> ErrorBody {
        resolved.error_handler.handle_error(&parts(), "m").body().clone()
    }

    fn defaults(verifier: &'static str, handler: Option<&'static str>) -> FilterDefaults {
        FilterDefaults {
            verifier: Arc::new(named(verifier)),
            error_handler: handler.map(|h| Arc::new(tagged(h)) as Arc<dyn ErrorHandler>),
        }
    }

    #[tokio::test]
    async fn filter_defaults_apply_without_overrides() {
        let mut ext = Extensions::new();
        let resolved = resolve(&mut ext, &defaults("default", Some("filter")));

        assert_eq!(subject(&resolved).await, "default");
        assert_eq!(body(&resolved), ErrorBody::from("filter:m"));
    }

    #[tokio::test]
    async fn echo_is_the_last_resort() {
        let mut ext = Extensions::new();
        let resolved = resolve(&mut ext, &defaults("default", None));
        assert_eq!(body(&resolved), ErrorBody::from("m"));
    }

    #[tokio::test]
    async fn route_overrides_win_field_by_field() {
        let mut ext = Extensions::new();
        ext.insert(RouteOverrides::new().on_verifying(named("route")));

        let resolved = resolve(&mut ext, &defaults("default", Some("filter")));
        assert_eq!(subject(&resolved).await, "route");
        assert_eq!(body(&resolved), ErrorBody::from("filter:m"));

        let mut ext = Extensions::new();
        ext.insert(RouteOverrides::new().on_error(tagged("route")));

        let resolved = resolve(&mut ext, &defaults("default", Some("filter")));
        assert_eq!(subject(&resolved).await, "default");
        assert_eq!(body(&resolved), ErrorBody::from("route:m"));
    }

    #[tokio::test]
    async fn second_resolution_keeps_the_first() {
        let mut ext = Extensions::new();
        resolve(&mut ext, &defaults("first", Some("first")));

        ext.insert(RouteOverrides::new().on_verifying(named("late")));
        let again = resolve(&mut ext, &defaults("second", Some("second")));

        assert_eq!(subject(&again).await, "first");
        assert_eq!(body(&again), ErrorBody::from("first:m"));

        let stored = ext.get::<ResolvedAuth>().unwrap();
        assert_eq!(subject(stored).await, "first");
    }
}
