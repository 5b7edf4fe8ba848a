mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestApp;

#[tokio::test]
async fn rotation_invalidates_the_previous_key() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;
    let token = app.login(&owner).await?;

    let current = app.get("/api/key", Some(&token)).await?;
    assert_eq!(current.body["apiKey"], owner.api_key.as_str());

    let rotated = app.json(Method::POST, "/api/key/rotate", Some(&token), json!({})).await?;
    assert_eq!(rotated.status, StatusCode::OK);
    let new_key = rotated.body["apiKey"].as_str().unwrap_or_default().to_string();
    assert_ne!(new_key, owner.api_key);
    assert_eq!(new_key.len(), 48);

    let old = app.get("/api/project", Some(&owner.api_key)).await?;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let fresh = app.get("/api/project", Some(&new_key)).await?;
    assert_eq!(fresh.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn rotation_is_also_available_on_the_collection_route() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;
    let token = app.login(&owner).await?;

    let rotated = app.json(Method::POST, "/api/key", Some(&token), json!({})).await?;
    assert_eq!(rotated.status, StatusCode::OK);
    assert!(rotated.body["apiKey"].is_string());
    Ok(())
}

#[tokio::test]
async fn revoked_key_stops_working_until_next_rotation() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;
    let token = app.login(&owner).await?;

    let revoked = app.delete("/api/key", Some(&token)).await?;
    assert_eq!(revoked.status, StatusCode::OK);
    assert_eq!(revoked.body["message"], "API key deleted successfully");

    let view = app.get("/api/key", Some(&token)).await?;
    assert_eq!(view.body["apiKey"], Value::Null);

    let denied = app.get("/api/skills", Some(&owner.api_key)).await?;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);

    let rotated = app.json(Method::POST, "/api/key/rotate", Some(&token), json!({})).await?;
    let new_key = rotated.body["apiKey"].as_str().unwrap_or_default().to_string();
    let allowed = app.get("/api/skills", Some(&new_key)).await?;
    assert_eq!(allowed.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn api_key_cannot_rotate_itself() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;

    let res = app
        .json(Method::POST, "/api/key/rotate", Some(&owner.api_key), json!({}))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let still_valid = app.get("/api/key", Some(&owner.api_key)).await?;
    assert_eq!(still_valid.body["apiKey"], owner.api_key.as_str());
    Ok(())
}
