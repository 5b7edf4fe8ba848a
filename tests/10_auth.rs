mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use folio_api::auth::peek_profile_id;
use folio_api::database::SkillRepository;

#[tokio::test]
async fn health_endpoint_reports_connected_store() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/health", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["database"], "connected");

    let root = app.get("/", None).await?;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["name"], "folio-api");
    Ok(())
}

#[tokio::test]
async fn login_returns_token_and_profile_summary() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;

    let res = app
        .json(Method::POST, "/api/login", None, json!({ "accessKey": owner.access_key }))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Login successful");
    assert_eq!(res.body["profile"]["id"], owner.id);
    assert_eq!(res.body["profile"]["email"], "owner@example.com");
    assert!(res.body["profile"].get("accessKey").is_none());

    let token = res.body["token"].as_str().unwrap_or_default();
    assert_eq!(peek_profile_id(token), Some(owner.id));
    Ok(())
}

#[tokio::test]
async fn login_rejects_unknown_and_missing_access_key() -> Result<()> {
    let app = TestApp::new();
    app.seed_profile("owner@example.com").await?;

    let wrong = app
        .json(Method::POST, "/api/login", None, json!({ "accessKey": "not-the-key" }))
        .await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "Invalid access key");

    let missing = app.json(Method::POST, "/api/login", None, json!({})).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_credential() -> Result<()> {
    let app = TestApp::new();
    app.seed_profile("owner@example.com").await?;

    let none = app.get("/api/project", None).await?;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);

    let garbage = app.get("/api/project", Some("definitely-not-valid")).await?;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn api_key_reads_but_cannot_write() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;

    let read = app.get("/api/project", Some(&owner.api_key)).await?;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body, json!([]));

    let write = app
        .json(
            Method::POST,
            "/api/skills",
            Some(&owner.api_key),
            json!({ "skillName": "Rust", "skillCategory": "Backend" }),
        )
        .await?;
    assert_eq!(write.status, StatusCode::FORBIDDEN);
    assert!(app.store.list_skills(owner.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn api_key_writes_when_read_only_policy_is_off() -> Result<()> {
    let mut config = folio_api::config::AppConfig::development();
    config.security.api_key_read_only = false;
    let app = TestApp::with_config(config);
    let owner = app.seed_profile("owner@example.com").await?;

    let write = app
        .json(
            Method::POST,
            "/api/skills",
            Some(&owner.api_key),
            json!({ "skillName": "Rust", "skillCategory": "Backend" }),
        )
        .await?;
    assert_eq!(write.status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;

    let foreign = folio_api::auth::TokenCodec::new("some-other-secret", std::time::Duration::from_secs(60))
        .issue(folio_api::auth::TokenSubject {
            profile_id: owner.id,
            email: "owner@example.com".into(),
            name: "Test Owner".into(),
            access_key: owner.access_key.clone(),
        })?;

    let res = app.get("/api/project", Some(&foreign)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_root_reports_the_resolved_caller() -> Result<()> {
    let app = TestApp::new();
    let owner = app.seed_profile("owner@example.com").await?;
    let token = app.login(&owner).await?;

    let via_token = app.get("/api/profile", Some(&token)).await?;
    assert_eq!(via_token.status, StatusCode::OK);
    assert_eq!(via_token.body["profileId"], owner.id);
    assert_eq!(via_token.body["email"], "owner@example.com");
    assert_eq!(via_token.body["via"], "token");
    assert!(via_token.body.get("accessKey").is_none());

    let via_key = app.get("/api/profile", Some(&owner.api_key)).await?;
    assert_eq!(via_key.body["profileId"], owner.id);
    assert_eq!(via_key.body["via"], "apiKey");

    assert_eq!(app.get("/api/profile", None).await?.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
