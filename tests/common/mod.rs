#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use folio_api::config::AppConfig;
use folio_api::database::models::NewProfile;
use folio_api::database::{MemoryStore, ProfileRepository};
use folio_api::state::AppState;
use folio_api::storage::{MemoryStorage, ObjectStore};

pub const BUCKET_URL: &str = "https://bucket.test";

/// A profile seeded straight into the store, with its plaintext secrets
pub struct Seeded {
    pub id: i32,
    pub access_key: String,
    pub api_key: String,
}

/// The router wired to in-memory backends the test can inspect
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryStorage::new(BUCKET_URL));
        let object_store: Arc<dyn ObjectStore> = storage.clone();
        let state = AppState::new(config, store.clone(), Some(object_store));
        Self {
            router: folio_api::app(state),
            store,
            storage,
        }
    }

    pub async fn seed_profile(&self, email: &str) -> Result<Seeded> {
        let access_key = format!("access-{}", email);
        let api_key = format!("api-{}", email);
        let profile = self
            .store
            .create_profile(NewProfile {
                name: "Test Owner".into(),
                title: "Engineer".into(),
                email: email.into(),
                access_key: access_key.clone(),
                api_key: api_key.clone(),
                about: String::new(),
            })
            .await?;
        Ok(Seeded {
            id: profile.id,
            access_key,
            api_key,
        })
    }

    /// Log in with the seeded access key and return the bearer token
    pub async fn login(&self, seeded: &Seeded) -> Result<String> {
        let response = self
            .json(Method::POST, "/api/login", None, serde_json::json!({ "accessKey": seeded.access_key }))
            .await?;
        anyhow::ensure!(response.status == StatusCode::OK, "login failed: {}", response.body);
        response.body["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("login response without token"))
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> Result<TestResponse> {
        let request = authorized(Request::builder().method(Method::GET).uri(uri), bearer).body(Body::empty())?;
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str, bearer: Option<&str>) -> Result<TestResponse> {
        let request = authorized(Request::builder().method(Method::DELETE).uri(uri), bearer).body(Body::empty())?;
        self.send(request).await
    }

    pub async fn json(&self, method: Method, uri: &str, bearer: Option<&str>, body: Value) -> Result<TestResponse> {
        let request = authorized(Request::builder().method(method).uri(uri), bearer)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?;
        self.send(request).await
    }

    pub async fn multipart(&self, uri: &str, bearer: Option<&str>, form: Multipart) -> Result<TestResponse> {
        let request = authorized(Request::builder().method(Method::POST).uri(uri), bearer)
            .header(header::CONTENT_TYPE, form.content_type())
            .body(Body::from(form.finish()))?;
        self.send(request).await
    }
}

fn authorized(builder: axum::http::request::Builder, bearer: Option<&str>) -> axum::http::request::Builder {
    match bearer {
        Some(credential) => builder.header(header::AUTHORIZATION, format!("Bearer {}", credential)),
        None => builder,
    }
}

/// Minimal multipart/form-data body builder
pub struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self {
            boundary: "folio-test-boundary".into(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}
