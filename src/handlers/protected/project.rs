// handlers/protected/project.rs - /api/project[/:id]
//
// Requests use the `project*` field names; responses and storage use the
// plain names (`name`, `description`, ...). `ProjectPayload` and `ProjectView`
// are the two directions of that mapping.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::models::{Project, ProjectDraft, ProjectType};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResult, Created, Identity, Message, ValidatedJson};
use crate::state::AppState;

/// Technologies arrive either as free text or as a list of names
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Technologies {
    Text(String),
    List(Vec<String>),
}

impl Technologies {
    fn into_text(self) -> String {
        match self {
            Technologies::Text(text) => text.trim().to_string(),
            Technologies::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Project name is required"))]
    pub project_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 10000, message = "Project description is required"))]
    pub project_description: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Project link is required"))]
    pub project_link: String,
    pub project_technologies: Option<Technologies>,
    pub project_type: Option<String>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
    #[serde(default)]
    pub has_article: bool,
    #[validate(length(max = 255))]
    pub article_link: Option<String>,
}

impl ProjectPayload {
    /// Checks the rules `validator` cannot express and maps to storage naming
    pub fn into_draft(self) -> Result<ProjectDraft, ApiError> {
        let technologies = self
            .project_technologies
            .map(Technologies::into_text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::field_error("projectTechnologies", "Project technologies are required"))?;

        let project_type = match self.project_type.as_deref() {
            None | Some("") => {
                return Err(ApiError::field_error("projectType", "Project type is required"));
            }
            Some(raw) => raw.parse::<ProjectType>().map_err(|_| {
                let allowed: Vec<_> = ProjectType::ALL.iter().map(|t| t.as_str()).collect();
                ApiError::field_error(
                    "projectType",
                    format!("Project type must be one of: {}", allowed.join(", ")),
                )
            })?,
        };

        let article_link = if self.has_article {
            match self.article_link.map(|l| l.trim().to_string()) {
                Some(link) if !link.is_empty() => Some(link),
                _ => {
                    return Err(ApiError::field_error(
                        "articleLink",
                        "Article link is required when the project has an article",
                    ))
                }
            }
        } else {
            None
        };

        Ok(ProjectDraft {
            name: self.project_name,
            description: self.project_description,
            image: self.image.unwrap_or_default(),
            link: self.project_link,
            technologies,
            project_type,
            has_article: self.has_article,
            article_link,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub link: String,
    pub technologies: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub image: String,
    pub has_article: bool,
    pub article_link: String,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            link: project.link,
            technologies: project.technologies,
            project_type: project.project_type,
            image: project.image,
            has_article: project.has_article,
            article_link: project.article_link.unwrap_or_default(),
        }
    }
}

/// GET /api/project - caller's projects, newest first
pub async fn project_list(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<Vec<ProjectView>>> {
    let projects = state.store.list_projects(identity.profile_id).await?;
    Ok(Json(projects.into_iter().map(ProjectView::from).collect()))
}

/// GET /api/project/:id
pub async fn project_get(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<ProjectView>> {
    let id = parse_id(&id, "project")?;
    let project = state
        .store
        .find_project(identity.profile_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(Json(project.into()))
}

/// POST /api/project
pub async fn project_post(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<ProjectPayload>,
) -> ApiResult<Created<ProjectView>> {
    let draft = payload.into_draft()?;
    let project = state.store.create_project(identity.profile_id, draft).await?;
    tracing::info!("Project {} created for profile {}", project.id, identity.profile_id);
    Ok(Created(project.into()))
}

/// PUT /api/project/:id
pub async fn project_put(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ProjectPayload>,
) -> ApiResult<Json<ProjectView>> {
    let id = parse_id(&id, "project")?;
    let draft = payload.into_draft()?;
    let project = state
        .store
        .update_project(identity.profile_id, id, draft)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(Json(project.into()))
}

/// DELETE /api/project/:id
pub async fn project_delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_id(&id, "project")?;
    if !state.store.delete_project(identity.profile_id, id).await? {
        return Err(ApiError::not_found("Project not found"));
    }
    tracing::info!("Project {} deleted for profile {}", id, identity.profile_id);
    Ok(Message("Project deleted successfully"))
}
