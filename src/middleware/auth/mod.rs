//! Bearer token authentication for axum routers.
//!
//! Responsibility:
//! - `Authorization: Bearer <token>` → delegated verification → `Claims` in request extensions
//! - Failure → injected error handler → 401, nothing downstream runs
//! - Per-route overrides (`RouteOverrides`) take precedence over filter defaults
//!
//! Authorization (what a subject may do) stays in handlers.

mod extract;
mod filter;
mod resolve;
mod respond;

pub use extract::bearer_credential;
pub use filter::{BearerAuth, apply, protect, protect_with};
pub use resolve::{FilterDefaults, ResolvedAuth, RouteOverrides, resolve};
pub use respond::{EchoMessage, ErrorBody, ErrorHandler, ErrorReply, unauthorized};
