use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::auth::firebase::GOOGLE_JWKS_URL;

const PRODUCTION_ORIGIN: &str = "https://artifacta-5240f.web.app";
const LOCAL_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("FB_SERVICE_KEY is not valid base64-encoded service account JSON: {0}")]
    InvalidServiceKey(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
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
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string; only optional when running on the in-memory store
    pub uri: Option<String>,
    pub database_name: String,
    pub collection_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Firebase project whose ID tokens are accepted
    pub project_id: Option<String>,
    pub jwks_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

/// The fields of a Firebase service-account key this service needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(v) = lookup("PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value: v })?;
        }

        // Database overrides
        if let Some(v) = lookup("DB_URI") {
            self.database.uri = Some(v);
        }
        if let Some(v) = lookup("DB_NAME") {
            self.database.database_name = v;
        }
        if let Some(v) = lookup("DB_COLLECTION") {
            self.database.collection_name = v;
        }

        // Identity overrides
        if let Some(v) = lookup("FB_SERVICE_KEY") {
            self.identity.project_id = Some(decode_service_account(&v)?.project_id);
        }
        if let Some(v) = lookup("FIREBASE_PROJECT_ID") {
            self.identity.project_id = Some(v);
        }
        if let Some(v) = lookup("FIREBASE_JWKS_URL") {
            self.identity.jwks_url = v;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn base(environment: Environment, cors_origins: Vec<String>) -> Self {
        Self {
            environment,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                uri: None,
                database_name: "artifactaDB".to_string(),
                collection_name: "artifacts".to_string(),
            },
            identity: IdentityConfig {
                project_id: None,
                jwks_url: GOOGLE_JWKS_URL.to_string(),
            },
            security: SecurityConfig { cors_origins },
        }
    }

    fn development() -> Self {
        Self::base(
            Environment::Development,
            vec![LOCAL_ORIGIN.to_string(), PRODUCTION_ORIGIN.to_string()],
        )
    }

    fn staging() -> Self {
        Self::base(
            Environment::Staging,
            vec![LOCAL_ORIGIN.to_string(), PRODUCTION_ORIGIN.to_string()],
        )
    }

    fn production() -> Self {
        Self::base(Environment::Production, vec![PRODUCTION_ORIGIN.to_string()])
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        AppConfig::development().security
    }
}

/// Decode the base64 service-account blob handed to the process
pub fn decode_service_account(encoded: &str) -> Result<ServiceAccount, ConfigError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::InvalidServiceKey(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ConfigError::InvalidServiceKey(e.to_string()))
}
