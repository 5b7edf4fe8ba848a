// handlers/public/mod.rs - Public handlers (no credential required)
//
// Token acquisition plus service liveness. Everything else is protected.

pub mod health;
pub mod login;

pub use health::{health_get, root_get};
pub use login::login_post;
