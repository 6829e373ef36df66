/*!
 * Request extractors for v1 handlers.
 *
 * Public API:
 * - `Claims` (required) / `Option<Claims>` (skipped or unauthenticated routes)
 */

mod claims;

pub use crate::services::auth::Claims;
