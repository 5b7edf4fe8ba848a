use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::database::PortfolioStore;
use crate::error::ApiError;
use crate::middleware::auth::IdentityResolver;
use crate::storage::{ObjectStore, UploadPolicy};

/// Shared handler state. Everything is behind `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn PortfolioStore>,
    pub storage: Option<Arc<dyn ObjectStore>>,
    pub tokens: TokenCodec,
    pub resolver: IdentityResolver,
    pub upload: UploadPolicy,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn PortfolioStore>,
        storage: Option<Arc<dyn ObjectStore>>,
    ) -> Self {
        let tokens = TokenCodec::from_config(&config.security);
        let resolver = IdentityResolver::new(tokens.clone(), store.clone(), config.security.api_key_read_only);
        let upload = UploadPolicy::from_config(&config.upload);
        Self {
            config: Arc::new(config),
            store,
            storage,
            tokens,
            resolver,
            upload,
        }
    }

    /// Object store, or 503 when the bucket is not configured
    pub fn object_store(&self) -> Result<&Arc<dyn ObjectStore>, ApiError> {
        self.storage
            .as_ref()
            .ok_or_else(|| crate::storage::StorageError::NotConfigured.into())
    }
}
