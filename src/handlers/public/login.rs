// handlers/public/login.rs - POST /api/login

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::keys::digest_access_key;
use crate::auth::TokenSubject;
use crate::database::models::ProfileSummary;
use crate::error::ApiError;
use crate::middleware::{ApiResult, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Access key is required"))]
    pub access_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub profile: ProfileSummary,
}

/// Exchange the access key for a bearer token.
///
/// The key is matched by digest; an unknown key is a plain 401 with no hint
/// about whether a profile exists.
pub async fn login_post(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let digest = digest_access_key(&request.access_key);

    let profile = match state.store.find_profile_by_access_digest(&digest).await? {
        Some(profile) => profile,
        None => {
            warn!("Login rejected: unknown access key");
            return Err(ApiError::unauthorized("Invalid access key"));
        }
    };

    let token = state.tokens.issue(TokenSubject {
        profile_id: profile.id,
        email: profile.email.clone(),
        name: profile.name.clone(),
        access_key: request.access_key,
    })?;

    info!("Login successful for profile {}", profile.id);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        profile: ProfileSummary::from(&profile),
    }))
}
