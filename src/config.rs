use std::path::Path;

use axum::http::HeaderValue;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::db::contact_repository::DEFAULT_CONTACT_COLLECTION;

pub const DEFAULT_MONGO_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DB_NAME: &str = "portfolio";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Server configuration.
///
/// Sources, later ones overriding earlier ones:
/// - built-in defaults
/// - an optional config file (`--config` / `FOLIO_CONFIG`)
/// - environment variables `MONGO_URL`, `DB_NAME`, `BIND_ADDR`,
///   `CORS_ORIGINS`, `CONTACT_COLLECTION`, `TRUST_PROXY_HEADERS`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo_url: String,
    pub db_name: String,
    pub bind_addr: String,
    /// `*` or a comma-separated list of allowed origins.
    pub cors_origins: String,
    pub contact_collection: String,
    /// Only enable behind a reverse proxy that overwrites forwarding headers.
    pub trust_proxy_headers: bool,
}

impl AppConfig {
    /// Load from defaults, the optional file and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(file, Environment::default())
    }

    fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("mongo_url", DEFAULT_MONGO_URL)?
            .set_default("db_name", DEFAULT_DB_NAME)?
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .set_default("cors_origins", "*")?
            .set_default("contact_collection", DEFAULT_CONTACT_COLLECTION)?
            .set_default("trust_proxy_headers", false)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        builder.add_source(env).build()?.try_deserialize()
    }

    /// CORS policy for the configured origins.
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let origins = self.cors_origins.trim();
        if origins == "*" {
            return Ok(CorsLayer::permissive());
        }

        let allowed = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| {
                HeaderValue::from_str(o)
                    .map_err(|e| ConfigError::Message(format!("Invalid CORS origin '{o}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}
