//! `Authorization: Bearer <token>` extraction.

use axum::http::{HeaderMap, header};

const BEARER_PREFIX: &str = "Bearer ";

/// The bearer credential of a request, if exactly one well-formed header is present.
///
/// The remainder after `"Bearer "` is returned verbatim. Anything else (no
/// header, repeated headers, another scheme, non-ASCII value) is `None`; the
/// caller treats all of those as "no token supplied".
pub fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();
    let value = values.next()?;
    if values.next().is_some() {
        return None;
    }

    value.to_str().ok()?.strip_prefix(BEARER_PREFIX)
}
