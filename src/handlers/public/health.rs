// handlers/public/health.rs - GET / and GET /health

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::state::AppState;

/// Service description
pub async fn root_get(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "environment": state.config.environment,
        "storage": state.storage.is_some(),
        "endpoints": {
            "public": ["POST /api/login", "GET /health"],
            "protected": [
                "/api/profile[/:id]",
                "/api/project[/:id]",
                "/api/skills[/:id]",
                "/api/employment[/:id]",
                "/api/prompt",
                "/api/key",
                "/api/upload"
            ]
        }
    }))
}

/// Database ping; 503 when the store cannot be reached
pub async fn health_get(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unreachable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "database": "connected",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
