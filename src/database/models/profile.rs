use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// The single owner record. Secrets never serialize.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub access_key_digest: String,
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    pub image: Option<String>,
    pub about: String,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub behance: Option<String>,
    pub facebook: Option<String>,
}

/// Fields echoed back on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub title: String,
    pub image: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            email: profile.email.clone(),
            title: profile.title.clone(),
            image: profile.image.clone(),
        }
    }
}

/// Provisioning input; only the operator CLI creates profiles.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub title: String,
    pub email: String,
    pub access_key: String,
    pub api_key: String,
    pub about: String,
}

/// Editable profile fields (`PUT /api/profile/:id`)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"), length(max = 255))]
    pub email: String,
    #[validate(length(max = 255))]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub about: String,
    #[validate(length(max = 255))]
    pub github: Option<String>,
    #[validate(length(max = 255))]
    pub linkedin: Option<String>,
    #[validate(length(max = 255))]
    pub behance: Option<String>,
    #[validate(length(max = 255))]
    pub facebook: Option<String>,
}

impl Profile {
    pub fn apply(&mut self, changes: ProfileChanges) {
        self.name = changes.name;
        self.title = changes.title;
        self.email = changes.email;
        self.image = changes.image;
        self.about = changes.about;
        self.github = changes.github;
        self.linkedin = changes.linkedin;
        self.behance = changes.behance;
        self.facebook = changes.facebook;
    }
}
