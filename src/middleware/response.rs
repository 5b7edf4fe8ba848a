use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// 201 with the created resource as the body
#[derive(Debug)]
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// `{"message": ...}` body used by deletes and revocation
#[derive(Debug)]
pub struct Message(pub &'static str);

impl IntoResponse for Message {
    fn into_response(self) -> Response {
        Json(json!({ "message": self.0 })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body that has been deserialized and run through `validator`.
/// Malformed JSON maps to `INVALID_JSON`, rule failures to `VALIDATION_ERROR`
/// with camelCase field names.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;
        value.validate().map_err(validation_failure)?;
        Ok(ValidatedJson(value))
    }
}

pub fn validation_failure(errors: ValidationErrors) -> ApiError {
    let mut field_errors = HashMap::new();
    for (field, failures) in errors.field_errors() {
        let message = failures
            .iter()
            .find_map(|f| f.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| format!("Invalid value for {}", camel_case(&field)));
        field_errors.insert(camel_case(&field), message);
    }

    let mut keys: Vec<_> = field_errors.keys().cloned().collect();
    keys.sort();
    let message = keys
        .first()
        .and_then(|k| field_errors.get(k))
        .cloned()
        .unwrap_or_else(|| "Validation failed".to_string());

    ApiError::validation_error(message, Some(field_errors))
}

fn camel_case(field: &str) -> String {
    // Struct-level errors are reported under "__all__"
    if field.starts_with('_') {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
