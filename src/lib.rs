pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::require_identity;
use crate::state::AppState;

/// Full HTTP surface. Public routes first, then everything under the auth gate.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .route("/api/login", post(public::login_post))
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(protected::profile_whoami))
        .route("/api/profile/:id", get(protected::profile_get).put(protected::profile_put))
        .route("/api/project", get(protected::project_list).post(protected::project_post))
        .route(
            "/api/project/:id",
            get(protected::project_get)
                .put(protected::project_put)
                .delete(protected::project_delete),
        )
        .route("/api/skills", get(protected::skill_list).post(protected::skill_post))
        .route("/api/skills/:id", delete(protected::skill_delete))
        .route(
            "/api/employment",
            get(protected::employment_list).post(protected::employment_post),
        )
        .route(
            "/api/employment/:id",
            get(protected::employment_get)
                .put(protected::employment_put)
                .delete(protected::employment_delete),
        )
        .route(
            "/api/prompt",
            get(protected::prompt_get)
                .post(protected::prompt_post)
                .put(protected::prompt_put),
        )
        .route(
            "/api/key",
            get(protected::api_key_get)
                .post(protected::api_key_rotate)
                .delete(protected::api_key_delete),
        )
        .route("/api/key/rotate", post(protected::api_key_rotate))
        .route(
            "/api/upload",
            post(protected::upload_post).delete(protected::upload_delete),
        )
        .route_layer(from_fn_with_state(state, require_identity))
}
