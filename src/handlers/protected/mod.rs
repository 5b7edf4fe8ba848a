// handlers/protected/mod.rs - Protected handlers (bearer token or API key)
//
// Route prefix: /api/*. Every handler here is scoped to the caller's
// `Identity`; rows owned by another profile answer exactly like missing rows.

pub mod api_key;
pub mod employment;
pub mod profile;
pub mod project;
pub mod prompt;
pub mod skill;
pub mod upload;

pub use api_key::{api_key_delete, api_key_get, api_key_rotate};
pub use employment::{employment_delete, employment_get, employment_list, employment_post, employment_put};
pub use profile::{profile_get, profile_put, profile_whoami};
pub use project::{project_delete, project_get, project_list, project_post, project_put};
pub use prompt::{prompt_get, prompt_post, prompt_put};
pub use skill::{skill_delete, skill_list, skill_post};
pub use upload::{upload_delete, upload_post};
