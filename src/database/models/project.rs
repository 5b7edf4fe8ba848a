use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Project row in storage naming
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub technologies: String,
    pub project_type: String,
    pub has_article: bool,
    pub article_link: Option<String>,
    pub profile_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    #[serde(rename = "Web App")]
    WebApp,
    #[serde(rename = "Website")]
    Website,
    #[serde(rename = "UI/UX Design")]
    UiUxDesign,
    #[serde(rename = "Portfolio")]
    Portfolio,
    #[serde(rename = "Mobile App")]
    MobileApp,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::WebApp => "Web App",
            ProjectType::Website => "Website",
            ProjectType::UiUxDesign => "UI/UX Design",
            ProjectType::Portfolio => "Portfolio",
            ProjectType::MobileApp => "Mobile App",
        }
    }

    pub const ALL: [ProjectType; 5] = [
        ProjectType::WebApp,
        ProjectType::Website,
        ProjectType::UiUxDesign,
        ProjectType::Portfolio,
        ProjectType::MobileApp,
    ];
}

impl FromStr for ProjectType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

/// Validated project content, storage naming, without identity columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub technologies: String,
    pub project_type: ProjectType,
    pub has_article: bool,
    pub article_link: Option<String>,
}

impl ProjectDraft {
    pub fn into_project(self, id: i32, profile_id: i32) -> Project {
        Project {
            id,
            name: self.name,
            description: self.description,
            image: self.image,
            link: self.link,
            technologies: self.technologies,
            project_type: self.project_type.as_str().to_string(),
            has_article: self.has_article,
            article_link: self.article_link,
            profile_id,
        }
    }
}
