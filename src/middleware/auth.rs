use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::TokenCodec;
use crate::database::{DatabaseError, PortfolioStore};
use crate::error::ApiError;
use crate::state::AppState;

/// How the caller proved who they are
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialKind {
    Token,
    ApiKey,
}

/// Resolved caller, attached to the request by the auth gate.
/// Never carries the access key.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub profile_id: i32,
    pub email: String,
    pub name: String,
    pub via: CredentialKind,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer credential")]
    MissingCredential,

    #[error("Credential is neither a valid token nor a known API key")]
    InvalidCredential,

    #[error("API key credentials are read-only")]
    ReadOnlyCredential,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Single identity-resolution path shared by the route middleware and the
/// `Identity` extractor: verify as a token first, fall back to an API key lookup.
#[derive(Clone)]
pub struct IdentityResolver {
    codec: TokenCodec,
    store: Arc<dyn PortfolioStore>,
    api_key_read_only: bool,
}

impl IdentityResolver {
    pub fn new(codec: TokenCodec, store: Arc<dyn PortfolioStore>, api_key_read_only: bool) -> Self {
        Self {
            codec,
            store,
            api_key_read_only,
        }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let credential = extract_bearer(headers).ok_or(AuthError::MissingCredential)?;

        match self.codec.verify(credential) {
            Ok(claims) => {
                debug!("Authenticated profile {} via token", claims.profile_id);
                return Ok(Identity {
                    profile_id: claims.profile_id,
                    email: claims.email,
                    name: claims.name,
                    via: CredentialKind::Token,
                });
            }
            Err(_) => debug!("Bearer credential is not a valid token, trying API key"),
        }

        match self.store.find_profile_by_api_key(credential).await? {
            Some(profile) => {
                debug!("Authenticated profile {} via API key", profile.id);
                Ok(Identity {
                    profile_id: profile.id,
                    email: profile.email,
                    name: profile.name,
                    via: CredentialKind::ApiKey,
                })
            }
            None => {
                warn!("Rejected bearer credential");
                Err(AuthError::InvalidCredential)
            }
        }
    }

    /// API-key callers may only read when the read-only policy is on
    pub fn authorize(&self, identity: &Identity, method: &Method) -> Result<(), AuthError> {
        let read = matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS);
        if identity.via == CredentialKind::ApiKey && self.api_key_read_only && !read {
            warn!("API key for profile {} attempted {}", identity.profile_id, method);
            return Err(AuthError::ReadOnlyCredential);
        }
        Ok(())
    }

    async fn resolve_for(&self, headers: &HeaderMap, method: &Method) -> Result<Identity, AuthError> {
        let identity = self.resolve(headers).await?;
        self.authorize(&identity, method)?;
        Ok(identity)
    }
}

/// Route-layer gate: resolves the caller and stores `Identity` in extensions
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = state
        .resolver
        .resolve_for(request.headers(), request.method())
        .await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Handlers take `Identity` directly. Behind the gate this reads the
/// extension; on an ungated route it runs the same resolver itself.
#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }
        Ok(state.resolver.resolve_for(&parts.headers, &parts.method).await?)
    }
}

/// Token from `Authorization: Bearer <credential>`; blank counts as missing
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credential) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let credential = credential.trim();
    (!credential.is_empty()).then_some(credential)
}
