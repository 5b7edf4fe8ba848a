// handlers/protected/employment.rs - /api/employment[/:id]
//
// `isActive` wins over a supplied `endDate`: active rows always store NULL.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{Employment, EmploymentDraft, EmploymentRuleViolation};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResult, Created, Identity, Message, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Company is required"))]
    pub company: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Position is required"))]
    pub position: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 10000, message = "Description is required"))]
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept)
fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ApiError::field_error(field, format!("{} must be a date (YYYY-MM-DD)", field)))
}

impl EmploymentPayload {
    fn into_draft(self) -> Result<EmploymentDraft, ApiError> {
        let start_date = match self.start_date.as_deref().map(str::trim) {
            None | Some("") => return Err(ApiError::field_error("startDate", "Start date is required")),
            Some(raw) => parse_date("startDate", raw)?,
        };

        // An end date on an active role is ignored, even if malformed
        let end_date = match (self.is_active, self.end_date.as_deref().map(str::trim)) {
            (true, _) | (false, None) | (false, Some("")) => None,
            (false, Some(raw)) => Some(parse_date("endDate", raw)?),
        };

        EmploymentDraft::new(
            self.company,
            self.position,
            self.description,
            start_date,
            end_date,
            self.is_active,
        )
        .map_err(|violation| match violation {
            EmploymentRuleViolation::MissingEndDate => {
                ApiError::field_error("endDate", "End date is required when not currently active")
            }
            EmploymentRuleViolation::EndBeforeStart => {
                ApiError::field_error("endDate", "End date cannot be before start date")
            }
        })
    }
}

/// GET /api/employment - newest first
pub async fn employment_list(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Vec<Employment>>> {
    Ok(Json(state.store.list_employments(identity.profile_id).await?))
}

/// GET /api/employment/:id
pub async fn employment_get(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<Employment>> {
    let id = parse_id(&id, "employment")?;
    let employment = state
        .store
        .find_employment(identity.profile_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employment not found"))?;
    Ok(Json(employment))
}

/// POST /api/employment
pub async fn employment_post(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<EmploymentPayload>,
) -> ApiResult<Created<Employment>> {
    let employment = state
        .store
        .create_employment(identity.profile_id, payload.into_draft()?)
        .await?;
    tracing::info!("Employment {} created for profile {}", employment.id, identity.profile_id);
    Ok(Created(employment))
}

/// PUT /api/employment/:id
pub async fn employment_put(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<EmploymentPayload>,
) -> ApiResult<Json<Employment>> {
    let id = parse_id(&id, "employment")?;
    let draft = payload.into_draft()?;
    let employment = state
        .store
        .update_employment(identity.profile_id, id, draft)
        .await?
        .ok_or_else(|| ApiError::not_found("Employment not found"))?;
    Ok(Json(employment))
}

/// DELETE /api/employment/:id
pub async fn employment_delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_id(&id, "employment")?;
    if !state.store.delete_employment(identity.profile_id, id).await? {
        return Err(ApiError::not_found("Employment not found"));
    }
    Ok(Message("Employment deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(value: serde_json::Value) -> Result<EmploymentDraft, ApiError> {
        serde_json::from_value::<EmploymentPayload>(value).unwrap().into_draft()
    }

    #[test]
    fn accepts_plain_and_timestamp_dates() {
        assert_eq!(
            parse_date("startDate", "2023-04-01").unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
        );
        assert_eq!(
            parse_date("startDate", "2023-04-01T00:00:00.000Z").unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
        );
        assert!(parse_date("startDate", "April 1st").is_err());
    }

    #[test]
    fn active_role_ignores_end_date() {
        let d = draft(json!({
            "company": "Acme", "position": "Dev", "description": "Work",
            "startDate": "2022-01-01", "endDate": "not a date", "isActive": true
        }))
        .unwrap();
        assert!(d.is_active());
        assert_eq!(d.end_date(), None);
    }

    #[test]
    fn inactive_role_without_end_date_is_rejected() {
        let err = draft(json!({
            "company": "Acme", "position": "Dev", "description": "Work",
            "startDate": "2022-01-01", "isActive": false
        }))
        .unwrap_err();
        assert_eq!(err.message(), "End date is required when not currently active");
    }
}
