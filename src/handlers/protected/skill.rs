// handlers/protected/skill.rs - /api/skills[/:id] (list, create, delete)

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{Skill, SkillCategory, SkillDraft};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResult, Created, Identity, Message, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SkillPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Skill name is required"))]
    pub skill_name: String,
    #[serde(default)]
    pub skill_category: String,
}

impl SkillPayload {
    fn into_draft(self) -> Result<SkillDraft, ApiError> {
        let name = self.skill_name.trim();
        if name.is_empty() {
            return Err(ApiError::field_error("skillName", "Skill name is required"));
        }
        let category = self
            .skill_category
            .parse::<SkillCategory>()
            .map_err(|_| ApiError::field_error("skillCategory", "Skill category must be Frontend, Backend or Other"))?;
        Ok(SkillDraft {
            name: name.to_string(),
            category,
        })
    }
}

/// GET /api/skills - ascending by id
pub async fn skill_list(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<Vec<Skill>>> {
    Ok(Json(state.store.list_skills(identity.profile_id).await?))
}

/// POST /api/skills
pub async fn skill_post(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<SkillPayload>,
) -> ApiResult<Created<Skill>> {
    let skill = state
        .store
        .create_skill(identity.profile_id, payload.into_draft()?)
        .await?;
    Ok(Created(skill))
}

/// DELETE /api/skills/:id
pub async fn skill_delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_id(&id, "skill")?;
    if !state.store.delete_skill(identity.profile_id, id).await? {
        return Err(ApiError::not_found("Skill not found"));
    }
    Ok(Message("Skill deleted successfully"))
}
