use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::keys::digest_access_key;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Employment, EmploymentDraft, NewProfile, Profile, ProfileChanges, Project, ProjectDraft, Skill, SkillDraft,
    SystemPrompt,
};
use crate::database::repository::{
    EmploymentRepository, PortfolioStore, ProfileRepository, ProjectRepository, PromptRepository, SkillRepository,
};

const PROFILE_COLUMNS: &str = "id, name, title, email, access_key_digest, api_key, image, about, \
                               github, linkedin, behance, facebook";
const PROJECT_COLUMNS: &str = "id, name, description, image, link, technologies, project_type, \
                               has_article, article_link, profile_id";
const SKILL_COLUMNS: &str = "id, name, category, profile_id";
const EMPLOYMENT_COLUMNS: &str = "id, company, position, description, start_date, end_date, is_active, profile_id";
const PROMPT_COLUMNS: &str = "id, prompt, profile_id";

/// Postgres-backed store; every statement is a single round trip
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_manager(manager: &DatabaseManager) -> Self {
        Self::new(manager.pool().clone())
    }
}

#[async_trait]
impl ProfileRepository for PgStore {
    async fn create_profile(&self, new: NewProfile) -> Result<Profile, DatabaseError> {
        let sql = format!(
            "INSERT INTO profiles (name, title, email, access_key_digest, api_key, about)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(&new.name)
            .bind(&new.title)
            .bind(&new.email)
            .bind(digest_access_key(&new.access_key))
            .bind(&new.api_key)
            .bind(&new.about)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        let sql = format!("SELECT {} FROM profiles ORDER BY id", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_profile(&self, id: i32) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_profile_by_access_digest(&self, digest: &str) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!("SELECT {} FROM profiles WHERE access_key_digest = $1", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(digest)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_profile_by_api_key(&self, api_key: &str) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM profiles WHERE api_key IS NOT NULL AND api_key = $1",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!(
            "UPDATE profiles
             SET name = $1, title = $2, email = $3, image = $4, about = $5,
                 github = $6, linkedin = $7, behance = $8, facebook = $9
             WHERE id = $10
             RETURNING {}",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(&changes.name)
            .bind(&changes.title)
            .bind(&changes.email)
            .bind(&changes.image)
            .bind(&changes.about)
            .bind(&changes.github)
            .bind(&changes.linkedin)
            .bind(&changes.behance)
            .bind(&changes.facebook)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_api_key(&self, id: i32, api_key: Option<&str>) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE profiles SET api_key = $1 WHERE id = $2")
            .bind(api_key)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn list_projects(&self, owner: i32) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE profile_id = $1 ORDER BY id DESC",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_project(&self, owner: i32, id: i32) -> Result<Option<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND profile_id = $2",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_project(&self, owner: i32, draft: ProjectDraft) -> Result<Project, DatabaseError> {
        let sql = format!(
            "INSERT INTO projects
                (name, description, image, link, technologies, project_type, has_article, article_link, profile_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.image)
            .bind(&draft.link)
            .bind(&draft.technologies)
            .bind(draft.project_type.as_str())
            .bind(draft.has_article)
            .bind(&draft.article_link)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_project(
        &self,
        owner: i32,
        id: i32,
        draft: ProjectDraft,
    ) -> Result<Option<Project>, DatabaseError> {
        let sql = format!(
            "UPDATE projects
             SET name = $1, description = $2, image = $3, link = $4, technologies = $5,
                 project_type = $6, has_article = $7, article_link = $8
             WHERE id = $9 AND profile_id = $10
             RETURNING {}",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.image)
            .bind(&draft.link)
            .bind(&draft.technologies)
            .bind(draft.project_type.as_str())
            .bind(draft.has_article)
            .bind(&draft.article_link)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_project(&self, owner: i32, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SkillRepository for PgStore {
    async fn list_skills(&self, owner: i32) -> Result<Vec<Skill>, DatabaseError> {
        let sql = format!("SELECT {} FROM skills WHERE profile_id = $1 ORDER BY id", SKILL_COLUMNS);
        Ok(sqlx::query_as::<_, Skill>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_skill(&self, owner: i32, draft: SkillDraft) -> Result<Skill, DatabaseError> {
        let sql = format!(
            "INSERT INTO skills (name, category, profile_id) VALUES ($1, $2, $3) RETURNING {}",
            SKILL_COLUMNS
        );
        Ok(sqlx::query_as::<_, Skill>(&sql)
            .bind(&draft.name)
            .bind(draft.category.as_str())
            .bind(owner)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_skill(&self, owner: i32, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EmploymentRepository for PgStore {
    async fn list_employments(&self, owner: i32) -> Result<Vec<Employment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM employments WHERE profile_id = $1 ORDER BY id DESC",
            EMPLOYMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Employment>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_employment(&self, owner: i32, id: i32) -> Result<Option<Employment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM employments WHERE id = $1 AND profile_id = $2",
            EMPLOYMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Employment>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_employment(&self, owner: i32, draft: EmploymentDraft) -> Result<Employment, DatabaseError> {
        let sql = format!(
            "INSERT INTO employments (company, position, description, start_date, end_date, is_active, profile_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            EMPLOYMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Employment>(&sql)
            .bind(draft.company())
            .bind(draft.position())
            .bind(draft.description())
            .bind(draft.start_date())
            .bind(draft.end_date())
            .bind(draft.is_active())
            .bind(owner)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_employment(
        &self,
        owner: i32,
        id: i32,
        draft: EmploymentDraft,
    ) -> Result<Option<Employment>, DatabaseError> {
        let sql = format!(
            "UPDATE employments
             SET company = $1, position = $2, description = $3, start_date = $4, end_date = $5, is_active = $6
             WHERE id = $7 AND profile_id = $8
             RETURNING {}",
            EMPLOYMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Employment>(&sql)
            .bind(draft.company())
            .bind(draft.position())
            .bind(draft.description())
            .bind(draft.start_date())
            .bind(draft.end_date())
            .bind(draft.is_active())
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_employment(&self, owner: i32, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM employments WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PromptRepository for PgStore {
    async fn find_prompt(&self, owner: i32) -> Result<Option<SystemPrompt>, DatabaseError> {
        let sql = format!("SELECT {} FROM system_prompts WHERE profile_id = $1", PROMPT_COLUMNS);
        Ok(sqlx::query_as::<_, SystemPrompt>(&sql)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_prompt(&self, owner: i32, prompt: &str) -> Result<SystemPrompt, DatabaseError> {
        let sql = format!(
            "INSERT INTO system_prompts (prompt, profile_id) VALUES ($1, $2) RETURNING {}",
            PROMPT_COLUMNS
        );
        // The unique index on profile_id surfaces as DatabaseError::Conflict
        Ok(sqlx::query_as::<_, SystemPrompt>(&sql)
            .bind(prompt)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_prompt(&self, owner: i32, prompt: &str) -> Result<Option<SystemPrompt>, DatabaseError> {
        let sql = format!(
            "UPDATE system_prompts SET prompt = $1 WHERE profile_id = $2 RETURNING {}",
            PROMPT_COLUMNS
        );
        Ok(sqlx::query_as::<_, SystemPrompt>(&sql)
            .bind(prompt)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl PortfolioStore for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
