//! Configuration module
//!
//! Process configuration is loaded once from the environment (and an optional `.env`
//! file) and passed explicitly to every component that needs it.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_SIGNED_URL_TTL_SECS};
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_NAME_LEN: usize = 255;
const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Record store implementation selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStoreBackend {
    Postgres,
    Memory,
}

impl FromStr for RecordStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(RecordStoreBackend::Postgres),
            "memory" => Ok(RecordStoreBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid record store backend: {}", s)),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "console" | "text" => Ok(LogFormat::Pretty),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
    // Record store
    pub record_store: RecordStoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Blob store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_signing_secret: Option<String>,
    // Upload lifecycle
    pub signed_url_ttl_secs: u64,
    pub operation_timeout_secs: u64,
    pub max_file_name_len: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "json".to_string())
                .parse()?,
            record_store: env::var("RECORD_STORE")
                .unwrap_or_else(|_| "postgres".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "s3".to_string())
                .parse()?,
            s3_bucket: env::var("S3_BUCKET").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION").ok().filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok().filter(|s| !s.is_empty()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            local_signing_secret: env::var("LOCAL_SIGNING_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS),
            operation_timeout_secs: env::var("OPERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECS),
            max_file_name_len: env::var("MAX_FILE_NAME_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FILE_NAME_LEN),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.record_store == RecordStoreBackend::Postgres {
            match self.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when RECORD_STORE=postgres"
                    ))
                }
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                match self.local_signing_secret.as_deref() {
                    Some(secret) if secret.len() >= MIN_SIGNING_SECRET_LEN => {}
                    _ => {
                        return Err(anyhow::anyhow!(
                            "LOCAL_SIGNING_SECRET must be at least {} characters long",
                            MIN_SIGNING_SECRET_LEN
                        ))
                    }
                }
            }
            StorageBackend::Memory => {}
        }

        if self.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("SIGNED_URL_TTL_SECS must be greater than 0"));
        }
        if self.operation_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "OPERATION_TIMEOUT_SECS must be greater than 0"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// S3 region, falling back to `AWS_REGION`.
    pub fn effective_s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }
}

impl Default for Config {
    /// Development defaults: in-memory record store, in-memory blobs.
    fn default() -> Self {
        Config {
            server_port: 8080,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            record_store: RecordStoreBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            local_signing_secret: None,
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            max_file_name_len: MAX_FILE_NAME_LEN,
        }
    }
}
