//! Application configuration.
//!
//! All settings are read from the environment exactly once in `main` and
//! carried in an explicit struct; nothing reads environment variables after
//! startup. Object-store settings are optional as a group: none set means
//! the upload endpoints degrade to a configuration error, a partial set is
//! a startup failure.

use std::env;

const DEFAULT_DATABASE_URL: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE_NAME: &str = "invitapp";
const DEFAULT_PORT: u16 = 4000;

/// Errors raised while assembling the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {name} is not set")]
    MissingVar { name: &'static str },
    #[error("PORT must be a number between 1 and 65535, got {value:?}")]
    InvalidPort { value: String },
    #[error("object storage configured partially; missing {name}")]
    IncompleteObjectStore { name: &'static str },
}

/// Object-storage coordinates and credentials.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Startup configuration for the whole process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub port: u16,
    pub object_store: Option<ObjectStoreConfig>,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Assemble the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let database_name =
            lookup("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_owned());
        let jwt_secret =
            lookup("JWT_SECRET").ok_or(ConfigError::MissingVar { name: "JWT_SECRET" })?;
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port > 0)
                .ok_or(ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            database_url,
            database_name,
            jwt_secret,
            port,
            object_store: object_store_from_lookup(&lookup)?,
        })
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> (String, u16) {
        ("0.0.0.0".to_owned(), self.port)
    }
}

fn object_store_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<ObjectStoreConfig>, ConfigError> {
    let bucket = lookup("S3_BUCKET");
    let region = lookup("S3_REGION");
    let access_key = lookup("AWS_ACCESS_KEY_ID");
    let secret_key = lookup("AWS_SECRET_ACCESS_KEY");
    if bucket.is_none() && region.is_none() && access_key.is_none() && secret_key.is_none() {
        return Ok(None);
    }
    let require = |name: &'static str, value: Option<String>| {
        value.ok_or(ConfigError::IncompleteObjectStore { name })
    };
    Ok(Some(ObjectStoreConfig {
        bucket: require("S3_BUCKET", bucket)?,
        region: require("S3_REGION", region)?,
        access_key: require("AWS_ACCESS_KEY_ID", access_key)?,
        secret_key: require("AWS_SECRET_ACCESS_KEY", secret_key)?,
    }))
}
