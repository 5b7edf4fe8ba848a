use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is unset outside production.
const DEVELOPMENT_JWT_SECRET: &str = "folio-development-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub upload: UploadConfig,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub require_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_lifetime_secs: u64,
    pub api_key_read_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub allowed_types: Vec<String>,
    pub default_folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub region: String,
    pub access_key_id: String,
    #[serde(skip_serializing)]
    pub secret_access_key: String,
    pub bucket: String,
    pub public_base_url: String,
    pub endpoint: Option<String>,
}

impl SecurityConfig {
    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: v })?;
        }

        // Database
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_REQUIRE_TLS") {
            self.database.require_tls = v.parse().unwrap_or(self.database.require_tls);
        }

        // API
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security
        match env::var("JWT_SECRET") {
            Ok(v) if !v.trim().is_empty() => self.security.jwt_secret = v,
            _ if self.environment == Environment::Production => {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development signing secret");
            }
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN") {
            self.security.token_lifetime_secs = parse_lifetime(&v)
                .ok_or(ConfigError::Invalid { key: "JWT_EXPIRES_IN", value: v })?;
        }
        if let Ok(v) = env::var("API_KEY_READ_ONLY") {
            self.security.api_key_read_only = v.parse().unwrap_or(self.security.api_key_read_only);
        }

        // Uploads
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.upload.max_bytes = v.parse().unwrap_or(self.upload.max_bytes);
        }

        // Object storage is all-or-nothing
        self.storage = match (
            env::var("AWS_S3_BUCKET_NAME"),
            env::var("AWS_S3_BUCKET_URL"),
        ) {
            (Ok(bucket), Ok(public_base_url)) => Some(StorageConfig {
                region: env::var("AWS_BUCKET_REGION").map_err(|_| ConfigError::Missing("AWS_BUCKET_REGION"))?,
                access_key_id: env::var("AWS_BUCKET_ACCESS_KEY")
                    .map_err(|_| ConfigError::Missing("AWS_BUCKET_ACCESS_KEY"))?,
                secret_access_key: env::var("AWS_BUCKET_SECRET_ACCESS_KEY")
                    .map_err(|_| ConfigError::Missing("AWS_BUCKET_SECRET_ACCESS_KEY"))?,
                bucket,
                public_base_url: public_base_url.trim_end_matches('/').to_string(),
                endpoint: env::var("AWS_S3_ENDPOINT").ok(),
            }),
            _ => None,
        };

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connect_timeout_secs: 30,
                require_tls: false,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                token_lifetime_secs: 7 * 24 * 60 * 60, // 7 days
                api_key_read_only: true,
            },
            upload: UploadConfig::default(),
            storage: None,
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 10;
        config.database.connect_timeout_secs = 10;
        config.database.require_tls = true;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 10;
        config.database.connect_timeout_secs = 5;
        config.database.require_tls = true;
        config.security.jwt_secret = String::new();
        config
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024, // 5MB
            allowed_types: ["image/jpeg", "image/png", "image/gif", "image/webp", "image/avif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_folder: "uploads".to_string(),
        }
    }
}

/// Longest accepted token lifetime (5 years)
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 5 * 365 * 24 * 60 * 60;

/// Parses `7d`, `12h`, `30m`, `45s` or bare seconds into seconds.
/// Zero and anything above [`MAX_TOKEN_LIFETIME_SECS`] are rejected.
pub fn parse_lifetime(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let (digits, multiplier) = match value.chars().last()? {
        's' => (&value[..value.len() - 1], 1),
        'm' => (&value[..value.len() - 1], 60),
        'h' => (&value[..value.len() - 1], 60 * 60),
        'd' => (&value[..value.len() - 1], 24 * 60 * 60),
        c if c.is_ascii_digit() => (value, 1),
        _ => return None,
    };
    let amount: u64 = digits.trim().parse().ok()?;
    if amount == 0 {
        return None;
    }
    amount
        .checked_mul(multiplier)
        .filter(|secs| *secs <= MAX_TOKEN_LIFETIME_SECS)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<Result<AppConfig, String>> =
    Lazy::new(|| AppConfig::from_env().map_err(|e| e.to_string()));

// Convenience function for accessing config
pub fn config() -> anyhow::Result<&'static AppConfig> {
    CONFIG.as_ref().map_err(|e| anyhow::anyhow!("{}", e))
}
