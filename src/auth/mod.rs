pub mod keys;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::SecurityConfig;

/// Identity claims embedded in a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub profile_id: i32,
    pub email: String,
    pub name: String,
    pub access_key: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims supplied by the caller; timestamps are stamped at issue time
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub profile_id: i32,
    pub email: String,
    pub name: String,
    pub access_key: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    InvalidOrExpired,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Signs and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenCodec {
    inner: Arc<CodecKeys>,
}

struct CodecKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, lifetime: std::time::Duration) -> Self {
        let lifetime = Duration::from_std(lifetime).unwrap_or_else(|_| Duration::days(7));
        Self {
            inner: Arc::new(CodecKeys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                lifetime,
            }),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, security.token_lifetime())
    }

    pub fn lifetime(&self) -> Duration {
        self.inner.lifetime
    }

    pub fn issue(&self, subject: TokenSubject) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn issue_at(&self, subject: TokenSubject, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.inner.lifetime)
            .ok_or_else(|| TokenError::Encoding("token lifetime overflows the expiry timestamp".into()))?;
        let claims = Claims {
            profile_id: subject.profile_id,
            email: subject.email,
            name: subject.name,
            access_key: subject.access_key,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Checks signature and expiry; expiry has no leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.inner.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                TokenError::InvalidOrExpired
            })
    }
}

/// Reads `profileId` from the payload segment WITHOUT verifying the token.
///
/// Only useful for building URLs on the client side; never authorize with it.
pub fn peek_profile_id(token: &str) -> Option<i32> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Peek {
        profile_id: Option<i32>,
    }

    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<Peek>(&bytes).ok()?.profile_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject {
        TokenSubject {
            profile_id: 42,
            email: "owner@example.com".into(),
            name: "Owner".into(),
            access_key: "open-sesame".into(),
        }
    }

    fn codec(lifetime_secs: u64) -> TokenCodec {
        TokenCodec::new("test-secret", std::time::Duration::from_secs(lifetime_secs))
    }

    #[test]
    fn issued_token_verifies() {
        let codec = codec(3600);
        let token = codec.issue(subject()).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.profile_id, 42);
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.access_key, "open-sesame");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_with_one_second_remaining_verifies() {
        let codec = codec(3600);
        let issued_at = Utc::now() - Duration::seconds(3600 - 1);
        let token = codec.issue_at(subject(), issued_at).unwrap();
        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn token_past_lifetime_is_rejected() {
        let codec = codec(3600);
        let issued_at = Utc::now() - Duration::seconds(3600 + 1);
        let token = codec.issue_at(subject(), issued_at).unwrap();
        assert!(matches!(codec.verify(&token), Err(TokenError::InvalidOrExpired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenCodec::new("other", std::time::Duration::from_secs(60))
            .issue(subject())
            .unwrap();
        assert!(codec(60).verify(&token).is_err());
    }

    #[test]
    fn lifetime_past_the_calendar_is_an_error() {
        let codec = codec(100_000_000_000 * 24 * 60 * 60);
        assert!(matches!(codec.issue(subject()), Err(TokenError::Encoding(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(codec(60).verify("not-a-token").is_err());
        assert!(codec(60).verify("").is_err());
    }

    #[test]
    fn claims_use_camel_case_on_the_wire() {
        let token = codec(60).issue(subject()).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(json["profileId"], 42);
        assert_eq!(json["accessKey"], "open-sesame");
    }

    #[test]
    fn peek_reads_profile_id_without_verification() {
        let token = TokenCodec::new("whatever", std::time::Duration::from_secs(60))
            .issue(subject())
            .unwrap();
        assert_eq!(peek_profile_id(&token), Some(42));
        assert_eq!(peek_profile_id("abc"), None);
        assert_eq!(peek_profile_id("a.%%%.c"), None);
    }
}
