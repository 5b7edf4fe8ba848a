// handlers/mod.rs - Two-tier handler architecture
//
// Public (no credential) → Protected (bearer token or API key).
// Protected routes sit behind `middleware::auth::require_identity`; every
// protected handler also takes `Identity` so ownership scoping is explicit.

pub mod protected;
pub mod public;

use crate::error::ApiError;

/// Path ids arrive as strings so a non-numeric id is a 400, not a router 404
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {} ID", resource)))
}
