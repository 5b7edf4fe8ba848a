// handlers/protected/upload.rs - POST/DELETE /api/upload
//
// POST: multipart with an `image` file part and optional `folder` text part.
// The MIME type is checked before any bytes are read and the size while
// streaming, so rejected files never reach the object store.

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::{ApiResult, Identity, Message, ValidatedJson};
use crate::state::AppState;
use crate::storage::{key_from_url, public_url, UploadPolicy};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteUploadPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "File URL is required"))]
    pub url: String,
}

struct ImagePart {
    file_name: String,
    content_type: String,
    body: Bytes,
}

async fn read_image(policy: &UploadPolicy, mut field: Field<'_>) -> Result<ImagePart, ApiError> {
    let content_type = policy.check_content_type(field.content_type())?;
    let file_name = field.file_name().unwrap_or("file").to_string();

    let mut buffer = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        policy.check_size(buffer.len() + chunk.len())?;
        buffer.extend_from_slice(&chunk);
    }

    Ok(ImagePart {
        file_name,
        content_type,
        body: buffer.freeze(),
    })
}

/// POST /api/upload -> `{url}`
pub async fn upload_post(
    State(state): State<AppState>,
    identity: Identity,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let store = state.object_store()?.clone();

    let mut image = None;
    let mut folder = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        match field.name() {
            Some("image") => {
                let part = read_image(&state.upload, field).await.inspect_err(|_| {
                    warn!("Upload rejected for profile {}", identity.profile_id);
                })?;
                image = Some(part);
            }
            Some("folder") => {
                folder = Some(field.text().await.map_err(|e| ApiError::bad_request(e.body_text()))?);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::field_error("image", "No file uploaded"))?;
    let folder = state.upload.resolve_folder(folder.as_deref())?;
    let key = state.upload.object_key(&folder, &image.file_name);

    store.put(&key, image.body, &image.content_type).await?;

    let url = public_url(store.public_base_url(), &key);
    info!("Uploaded {} for profile {}", key, identity.profile_id);
    Ok(Json(UploadResponse { url }))
}

/// DELETE /api/upload with `{url}`; URLs outside the bucket are refused
pub async fn upload_delete(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<DeleteUploadPayload>,
) -> ApiResult<Message> {
    let store = state.object_store()?.clone();
    let key = key_from_url(store.public_base_url(), payload.url.trim())?;
    store.delete(&key).await?;
    info!("Deleted {} for profile {}", key, identity.profile_id);
    Ok(Message("File deleted successfully"))
}
