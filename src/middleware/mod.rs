pub mod auth;
pub mod response;

pub use auth::{require_identity, CredentialKind, Identity, IdentityResolver};
pub use response::{ApiResult, Created, Message, ValidatedJson};
