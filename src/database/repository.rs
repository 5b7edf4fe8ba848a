use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Employment, EmploymentDraft, NewProfile, Profile, ProfileChanges, Project, ProjectDraft, Skill, SkillDraft,
    SystemPrompt,
};

/// Profile persistence. Profiles are provisioned out of band and never deleted.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create_profile(&self, new: NewProfile) -> Result<Profile, DatabaseError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError>;

    async fn find_profile(&self, id: i32) -> Result<Option<Profile>, DatabaseError>;

    /// Lookup by SHA-256 hex digest of the access key
    async fn find_profile_by_access_digest(&self, digest: &str) -> Result<Option<Profile>, DatabaseError>;

    /// Lookup by API key; a revoked (NULL) key never matches
    async fn find_profile_by_api_key(&self, api_key: &str) -> Result<Option<Profile>, DatabaseError>;

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<Option<Profile>, DatabaseError>;

    /// Overwrite or clear the API key. Returns false when the profile is gone.
    async fn set_api_key(&self, id: i32, api_key: Option<&str>) -> Result<bool, DatabaseError>;
}

/// Every method is scoped by `(id, owner)`; a row owned by someone else
/// behaves exactly like a missing row.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_projects(&self, owner: i32) -> Result<Vec<Project>, DatabaseError>;

    async fn find_project(&self, owner: i32, id: i32) -> Result<Option<Project>, DatabaseError>;

    async fn create_project(&self, owner: i32, draft: ProjectDraft) -> Result<Project, DatabaseError>;

    async fn update_project(&self, owner: i32, id: i32, draft: ProjectDraft)
        -> Result<Option<Project>, DatabaseError>;

    async fn delete_project(&self, owner: i32, id: i32) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn list_skills(&self, owner: i32) -> Result<Vec<Skill>, DatabaseError>;

    async fn create_skill(&self, owner: i32, draft: SkillDraft) -> Result<Skill, DatabaseError>;

    async fn delete_skill(&self, owner: i32, id: i32) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait EmploymentRepository: Send + Sync {
    async fn list_employments(&self, owner: i32) -> Result<Vec<Employment>, DatabaseError>;

    async fn find_employment(&self, owner: i32, id: i32) -> Result<Option<Employment>, DatabaseError>;

    async fn create_employment(&self, owner: i32, draft: EmploymentDraft) -> Result<Employment, DatabaseError>;

    async fn update_employment(
        &self,
        owner: i32,
        id: i32,
        draft: EmploymentDraft,
    ) -> Result<Option<Employment>, DatabaseError>;

    async fn delete_employment(&self, owner: i32, id: i32) -> Result<bool, DatabaseError>;
}

/// At most one prompt per owner
#[async_trait]
pub trait PromptRepository: Send + Sync {
    async fn find_prompt(&self, owner: i32) -> Result<Option<SystemPrompt>, DatabaseError>;

    /// Fails with `Conflict` when the owner already has a prompt
    async fn create_prompt(&self, owner: i32, prompt: &str) -> Result<SystemPrompt, DatabaseError>;

    async fn update_prompt(&self, owner: i32, prompt: &str) -> Result<Option<SystemPrompt>, DatabaseError>;
}

/// Everything the HTTP layer needs from persistence
#[async_trait]
pub trait PortfolioStore:
    ProfileRepository + ProjectRepository + SkillRepository + EmploymentRepository + PromptRepository
{
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
