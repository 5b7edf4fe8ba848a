// handlers/protected/api_key.rs - GET/POST/DELETE /api/key, POST /api/key/rotate
//
// Rotation overwrites the stored key, so the previous key stops working on
// the very next request. Revocation stores NULL until the next rotation.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::keys::generate_api_key;
use crate::error::ApiError;
use crate::middleware::{ApiResult, Identity, Message};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyView {
    pub api_key: Option<String>,
}

/// GET /api/key - the caller's current key (null when revoked)
pub async fn api_key_get(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<ApiKeyView>> {
    let profile = state
        .store
        .find_profile(identity.profile_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(ApiKeyView {
        api_key: profile.api_key,
    }))
}

/// POST /api/key and POST /api/key/rotate
pub async fn api_key_rotate(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<ApiKeyView>> {
    let api_key = generate_api_key();
    if !state.store.set_api_key(identity.profile_id, Some(&api_key)).await? {
        return Err(ApiError::not_found("Profile not found"));
    }
    info!("API key rotated for profile {}", identity.profile_id);
    Ok(Json(ApiKeyView { api_key: Some(api_key) }))
}

/// DELETE /api/key
pub async fn api_key_delete(State(state): State<AppState>, identity: Identity) -> ApiResult<Message> {
    if !state.store.set_api_key(identity.profile_id, None).await? {
        return Err(ApiError::not_found("Profile not found"));
    }
    info!("API key revoked for profile {}", identity.profile_id);
    Ok(Message("API key deleted successfully"))
}
