// handlers/protected/profile.rs - GET /api/profile, GET/PUT /api/profile/:id
//
// A caller can only see or edit their own profile; any other id is a 404.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::{Profile, ProfileChanges};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResult, Identity, ValidatedJson};
use crate::state::AppState;

fn own_profile_id(raw: &str, identity: &Identity) -> Result<i32, ApiError> {
    let id = parse_id(raw, "profile")?;
    if id != identity.profile_id {
        return Err(ApiError::not_found("Profile not found"));
    }
    Ok(id)
}

/// GET /api/profile - the resolved caller, so clients learn their profile id
pub async fn profile_whoami(identity: Identity) -> Json<Identity> {
    Json(identity)
}

pub async fn profile_get(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<Profile>> {
    let id = own_profile_id(&id, &identity)?;
    let profile = state
        .store
        .find_profile(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}

pub async fn profile_put(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    ValidatedJson(changes): ValidatedJson<ProfileChanges>,
) -> ApiResult<Json<Profile>> {
    let id = own_profile_id(&id, &identity)?;
    let profile = state
        .store
        .update_profile(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    tracing::info!("Profile {} updated", id);
    Ok(Json(profile))
}
