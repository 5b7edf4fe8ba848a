use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::auth::keys::{digest_access_key, secrets_match};
use crate::database::manager::DatabaseError;
use crate::database::models::{
    Employment, EmploymentDraft, NewProfile, Profile, ProfileChanges, Project, ProjectDraft, Skill, SkillDraft,
    SystemPrompt,
};
use crate::database::repository::{
    EmploymentRepository, PortfolioStore, ProfileRepository, ProjectRepository, PromptRepository, SkillRepository,
};

#[derive(Default)]
struct Tables {
    next_id: i32,
    profiles: BTreeMap<i32, Profile>,
    projects: BTreeMap<i32, Project>,
    skills: BTreeMap<i32, Skill>,
    employments: BTreeMap<i32, Employment>,
    prompts: BTreeMap<i32, SystemPrompt>,
}

impl Tables {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store with the same ownership semantics as `PgStore`.
/// Backs the integration tests and local demos without Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn create_profile(&self, new: NewProfile) -> Result<Profile, DatabaseError> {
        let mut tables = self.tables.write();
        if tables
            .profiles
            .values()
            .any(|p| p.api_key.as_deref() == Some(new.api_key.as_str()))
        {
            return Err(DatabaseError::Conflict("Duplicate value violates profiles_api_key_key".into()));
        }
        let id = tables.allocate_id();
        let profile = Profile {
            id,
            name: new.name,
            title: new.title,
            email: new.email,
            access_key_digest: digest_access_key(&new.access_key),
            api_key: Some(new.api_key),
            image: None,
            about: new.about,
            github: None,
            linkedin: None,
            behance: None,
            facebook: None,
        };
        tables.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        Ok(self.tables.read().profiles.values().cloned().collect())
    }

    async fn find_profile(&self, id: i32) -> Result<Option<Profile>, DatabaseError> {
        Ok(self.tables.read().profiles.get(&id).cloned())
    }

    async fn find_profile_by_access_digest(&self, digest: &str) -> Result<Option<Profile>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .profiles
            .values()
            .find(|p| secrets_match(digest, &p.access_key_digest))
            .cloned())
    }

    async fn find_profile_by_api_key(&self, api_key: &str) -> Result<Option<Profile>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .profiles
            .values()
            .find(|p| p.api_key.as_deref().is_some_and(|stored| secrets_match(api_key, stored)))
            .cloned())
    }

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<Option<Profile>, DatabaseError> {
        let mut tables = self.tables.write();
        Ok(tables.profiles.get_mut(&id).map(|profile| {
            profile.apply(changes);
            profile.clone()
        }))
    }

    async fn set_api_key(&self, id: i32, api_key: Option<&str>) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write();
        Ok(match tables.profiles.get_mut(&id) {
            Some(profile) => {
                profile.api_key = api_key.map(str::to_string);
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn list_projects(&self, owner: i32) -> Result<Vec<Project>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .projects
            .values()
            .rev()
            .filter(|p| p.profile_id == owner)
            .cloned()
            .collect())
    }

    async fn find_project(&self, owner: i32, id: i32) -> Result<Option<Project>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .projects
            .get(&id)
            .filter(|p| p.profile_id == owner)
            .cloned())
    }

    async fn create_project(&self, owner: i32, draft: ProjectDraft) -> Result<Project, DatabaseError> {
        let mut tables = self.tables.write();
        let id = tables.allocate_id();
        let project = draft.into_project(id, owner);
        tables.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        owner: i32,
        id: i32,
        draft: ProjectDraft,
    ) -> Result<Option<Project>, DatabaseError> {
        let mut tables = self.tables.write();
        match tables.projects.get_mut(&id) {
            Some(existing) if existing.profile_id == owner => {
                *existing = draft.into_project(id, owner);
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_project(&self, owner: i32, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write();
        if tables.projects.get(&id).is_some_and(|p| p.profile_id == owner) {
            tables.projects.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl SkillRepository for MemoryStore {
    async fn list_skills(&self, owner: i32) -> Result<Vec<Skill>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .skills
            .values()
            .filter(|s| s.profile_id == owner)
            .cloned()
            .collect())
    }

    async fn create_skill(&self, owner: i32, draft: SkillDraft) -> Result<Skill, DatabaseError> {
        let mut tables = self.tables.write();
        let id = tables.allocate_id();
        let skill = Skill {
            id,
            name: draft.name,
            category: draft.category.as_str().to_string(),
            profile_id: owner,
        };
        tables.skills.insert(id, skill.clone());
        Ok(skill)
    }

    async fn delete_skill(&self, owner: i32, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write();
        if tables.skills.get(&id).is_some_and(|s| s.profile_id == owner) {
            tables.skills.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl EmploymentRepository for MemoryStore {
    async fn list_employments(&self, owner: i32) -> Result<Vec<Employment>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .employments
            .values()
            .rev()
            .filter(|e| e.profile_id == owner)
            .cloned()
            .collect())
    }

    async fn find_employment(&self, owner: i32, id: i32) -> Result<Option<Employment>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .employments
            .get(&id)
            .filter(|e| e.profile_id == owner)
            .cloned())
    }

    async fn create_employment(&self, owner: i32, draft: EmploymentDraft) -> Result<Employment, DatabaseError> {
        let mut tables = self.tables.write();
        let id = tables.allocate_id();
        let employment = draft.into_employment(id, owner);
        tables.employments.insert(id, employment.clone());
        Ok(employment)
    }

    async fn update_employment(
        &self,
        owner: i32,
        id: i32,
        draft: EmploymentDraft,
    ) -> Result<Option<Employment>, DatabaseError> {
        let mut tables = self.tables.write();
        match tables.employments.get_mut(&id) {
            Some(existing) if existing.profile_id == owner => {
                *existing = draft.into_employment(id, owner);
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_employment(&self, owner: i32, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write();
        if tables.employments.get(&id).is_some_and(|e| e.profile_id == owner) {
            tables.employments.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl PromptRepository for MemoryStore {
    async fn find_prompt(&self, owner: i32) -> Result<Option<SystemPrompt>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .prompts
            .values()
            .find(|p| p.profile_id == owner)
            .cloned())
    }

    async fn create_prompt(&self, owner: i32, prompt: &str) -> Result<SystemPrompt, DatabaseError> {
        let mut tables = self.tables.write();
        if tables.prompts.values().any(|p| p.profile_id == owner) {
            return Err(DatabaseError::Conflict("System prompt already exists".into()));
        }
        let id = tables.allocate_id();
        let record = SystemPrompt {
            id,
            prompt: prompt.to_string(),
            profile_id: owner,
        };
        tables.prompts.insert(id, record.clone());
        Ok(record)
    }

    async fn update_prompt(&self, owner: i32, prompt: &str) -> Result<Option<SystemPrompt>, DatabaseError> {
        let mut tables = self.tables.write();
        Ok(tables
            .prompts
            .values_mut()
            .find(|p| p.profile_id == owner)
            .map(|record| {
                record.prompt = prompt.to_string();
                record.clone()
            }))
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ProjectType;

    fn new_profile(access: &str, api: &str) -> NewProfile {
        NewProfile {
            name: "Ada".into(),
            title: "Engineer".into(),
            email: "ada@example.com".into(),
            access_key: access.into(),
            api_key: api.into(),
            about: String::new(),
        }
    }

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            name: name.into(),
            description: "d".into(),
            image: String::new(),
            link: "https://example.com".into(),
            technologies: "Rust".into(),
            project_type: ProjectType::WebApp,
            has_article: false,
            article_link: None,
        }
    }

    #[tokio::test]
    async fn other_owners_rows_look_missing() {
        let store = MemoryStore::new();
        let a = store.create_profile(new_profile("a", "ka")).await.unwrap();
        let b = store.create_profile(new_profile("b", "kb")).await.unwrap();
        let project = store.create_project(a.id, draft("one")).await.unwrap();

        assert!(store.find_project(b.id, project.id).await.unwrap().is_none());
        assert!(store.update_project(b.id, project.id, draft("two")).await.unwrap().is_none());
        assert!(!store.delete_project(b.id, project.id).await.unwrap());
        assert_eq!(store.find_project(a.id, project.id).await.unwrap().unwrap().name, "one");
    }

    #[tokio::test]
    async fn projects_list_newest_first() {
        let store = MemoryStore::new();
        let a = store.create_profile(new_profile("a", "ka")).await.unwrap();
        store.create_project(a.id, draft("first")).await.unwrap();
        store.create_project(a.id, draft("second")).await.unwrap();
        let names: Vec<_> = store
            .list_projects(a.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn revoked_api_key_never_matches() {
        let store = MemoryStore::new();
        let a = store.create_profile(new_profile("a", "ka")).await.unwrap();
        assert!(store.find_profile_by_api_key("ka").await.unwrap().is_some());
        store.set_api_key(a.id, None).await.unwrap();
        assert!(store.find_profile_by_api_key("ka").await.unwrap().is_none());
        assert!(store.find_profile_by_api_key("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_prompt_conflicts() {
        let store = MemoryStore::new();
        store.create_prompt(1, "first").await.unwrap();
        let err = store.create_prompt(1, "second").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert!(store.update_prompt(2, "x").await.unwrap().is_none());
    }
}
