//! 401 construction for failed authentication.
//!
//! Every failure path (missing header, rejected token, broken delegate) ends
//! here. The resolved [`ErrorHandler`] returns an [`ErrorReply`] (body plus
//! extra response headers); this module always answers 401.

use axum::{
    Json,
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

/// Body of an authentication failure response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// Serialized as JSON with `content-type: application/json`.
    Structured(Map<String, Value>),
    /// Sent as-is.
    Raw(Bytes),
}

impl ErrorBody {
    pub fn structured(body: Map<String, Value>) -> Self {
        Self::Structured(body)
    }

    pub fn raw(body: impl Into<Bytes>) -> Self {
        Self::Raw(body.into())
    }
}

impl From<String> for ErrorBody {
    fn from(message: String) -> Self {
        Self::Raw(Bytes::from(message))
    }
}

impl From<&str> for ErrorBody {
    fn from(message: &str) -> Self {
        Self::Raw(Bytes::copy_from_slice(message.as_bytes()))
    }
}

impl From<Map<String, Value>> for ErrorBody {
    fn from(body: Map<String, Value>) -> Self {
        Self::Structured(body)
    }
}

/// What an [`ErrorHandler`] hands back: the body and any headers to set on the 401.
///
/// Headers given here replace same-named ones the body would set, so a `Raw`
/// body can carry its own `content-type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReply {
    headers: HeaderMap,
    body: ErrorBody,
}

impl ErrorReply {
    pub fn new(body: impl Into<ErrorBody>) -> Self {
        Self {
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// e.g. `WWW-Authenticate: Bearer error="invalid_token"`.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<ErrorBody> for ErrorReply {
    fn from(body: ErrorBody) -> Self {
        Self::new(body)
    }
}

/// Turns a failure message into the 401 reply.
///
/// `parts` is the rejected request, for handlers that tailor the reply (for
/// example by path or `Accept`). Closures returning either [`ErrorBody`] or
/// [`ErrorReply`] qualify.
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle_error(&self, parts: &Parts, message: &str) -> ErrorReply;
}

impl<F, R> ErrorHandler for F
where
    F: Fn(&Parts, &str) -> R + Send + Sync + 'static,
    R: Into<ErrorReply>,
{
    fn handle_error(&self, parts: &Parts, message: &str) -> ErrorReply {
        self(parts, message).into()
    }
}

/// Fallback handler: the message itself is the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoMessage;

impl ErrorHandler for EchoMessage {
    fn handle_error(&self, _parts: &Parts, message: &str) -> ErrorReply {
        ErrorReply::new(message)
    }
}

/// Run the handler and build the 401 from its reply.
pub fn unauthorized(handler: &dyn ErrorHandler, parts: &Parts, message: &str) -> Response {
    let ErrorReply { headers, body } = handler.handle_error(parts, message);

    let mut response = match body {
        ErrorBody::Structured(body) => Json(body).into_response(),
        ErrorBody::Raw(body) => Response::new(Body::from(body)),
    };
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response.headers_mut().extend(headers);
    response
}
