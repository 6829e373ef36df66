//! Bearer token authentication filter for axum.
//!
//! Requests carrying `Authorization: Bearer <token>` are verified by an
//! injected [`Verifier`](services::auth::Verifier); verified claims land in the
//! request extensions, everything else is answered with a 401 built by an
//! injected [`ErrorHandler`](middleware::auth::ErrorHandler).

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
