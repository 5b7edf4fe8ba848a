use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemPrompt {
    pub id: i32,
    pub prompt: String,
    pub profile_id: i32,
}
