use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Appwrite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub endpoint: String,
    pub project_id: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub database_id: String,
    pub collection_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// PEM encoded RSA public key of the identity provider
    pub jwt_public_key: Option<String>,
    pub jwt_issuer: Option<String>,
    pub jwt_expiry_hours: u64,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Self {
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

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Store overrides
        match env::var("NOTES_STORE").as_deref() {
            Ok("memory") => self.store.backend = StoreBackend::Memory,
            Ok("appwrite") => self.store.backend = StoreBackend::Appwrite,
            _ => {}
        }
        if let Ok(v) = env::var("APPWRITE_ENDPOINT") {
            self.store.endpoint = v;
        }
        if let Ok(v) = env::var("APPWRITE_PROJECT_ID") {
            self.store.project_id = v;
        }
        if let Ok(v) = env::var("APPWRITE_API_KEY") {
            self.store.api_key = v;
        }
        if let Ok(v) = env::var("APPWRITE_DATABASE_ID") {
            self.store.database_id = v;
        }
        if let Ok(v) = env::var("APPWRITE_NOTES_COLLECTION_ID") {
            self.store.collection_id = v;
        }

        // Security overrides
        if let Ok(v) = env::var("AUTH_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("AUTH_JWT_PUBLIC_KEY").or_else(|_| env::var("CLERK_JWT_KEY")) {
            // Keys passed through env files often carry literal \n sequences
            self.security.jwt_public_key = Some(v.replace("\\n", "\n"));
        }
        if let Ok(v) = env::var("AUTH_JWT_ISSUER") {
            self.security.jwt_issuer = Some(v);
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Checks the settings the server cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Appwrite {
            if self.store.project_id.is_empty() {
                return Err(ConfigError::Missing("APPWRITE_PROJECT_ID"));
            }
            if self.store.database_id.is_empty() {
                return Err(ConfigError::Missing("APPWRITE_DATABASE_ID"));
            }
            if self.store.collection_id.is_empty() {
                return Err(ConfigError::Missing("APPWRITE_NOTES_COLLECTION_ID"));
            }
            if url::Url::parse(&self.store.endpoint).is_err() {
                return Err(ConfigError::Invalid {
                    name: "APPWRITE_ENDPOINT",
                    value: self.store.endpoint.clone(),
                });
            }
        }

        if self.security.jwt_public_key.is_none() && self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("AUTH_JWT_PUBLIC_KEY or AUTH_JWT_SECRET"));
        }

        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_request_size_bytes: 100 * 1024,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                endpoint: "https://cloud.appwrite.io/v1".to_string(),
                project_id: String::new(),
                api_key: String::new(),
                database_id: "notes".to_string(),
                collection_id: "notes".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_public_key: None,
                jwt_issuer: None,
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_request_size_bytes: 100 * 1024,
            },
            store: StoreConfig {
                backend: StoreBackend::Appwrite,
                endpoint: "https://cloud.appwrite.io/v1".to_string(),
                project_id: String::new(),
                api_key: String::new(),
                database_id: String::new(),
                collection_id: String::new(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_public_key: None,
                jwt_issuer: None,
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_request_size_bytes: 100 * 1024,
            },
            store: StoreConfig {
                backend: StoreBackend::Appwrite,
                endpoint: "https://cloud.appwrite.io/v1".to_string(),
                project_id: String::new(),
                api_key: String::new(),
                database_id: String::new(),
                collection_id: String::new(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_public_key: None,
                jwt_issuer: None,
                jwt_expiry_hours: 4,
                cors_origins: Vec::new(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
