// handlers/protected/prompt.rs - GET/POST/PUT /api/prompt
//
// One system prompt per profile: POST creates it (409 if present),
// PUT replaces its text (404 if absent).

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::SystemPrompt;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResult, Created, Identity, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct PromptPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 100000, message = "Prompt is required"))]
    pub prompt: String,
}

pub async fn prompt_get(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<SystemPrompt>> {
    let prompt = state
        .store
        .find_prompt(identity.profile_id)
        .await?
        .ok_or_else(|| ApiError::not_found("System prompt not found"))?;
    Ok(Json(prompt))
}

pub async fn prompt_post(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<PromptPayload>,
) -> ApiResult<Created<SystemPrompt>> {
    match state.store.create_prompt(identity.profile_id, &payload.prompt).await {
        Ok(prompt) => Ok(Created(prompt)),
        Err(DatabaseError::Conflict(_)) => Err(ApiError::conflict(
            "System prompt already exists; use PUT to update it",
        )),
        Err(other) => Err(other.into()),
    }
}

pub async fn prompt_put(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<PromptPayload>,
) -> ApiResult<Json<SystemPrompt>> {
    let prompt = state
        .store
        .update_prompt(identity.profile_id, &payload.prompt)
        .await?
        .ok_or_else(|| ApiError::not_found("System prompt not found"))?;
    Ok(Json(prompt))
}
