use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domains::tag::TagConflictPolicy;

/// Remote bucket settings (used when STORAGE_URL is set)
#[derive(Debug, Clone)]
pub struct RemoteStorageConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub admin_emails: Vec<String>,
    pub remote_storage: Option<RemoteStorageConfig>,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub request_timeout: Duration,
    pub tag_conflict_policy: TagConflictPolicy,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let remote_storage = match env::var("STORAGE_URL").ok().filter(|v| !v.is_empty()) {
            Some(url) => Some(RemoteStorageConfig {
                url,
                service_key: env::var("STORAGE_SERVICE_KEY")
                    .context("STORAGE_SERVICE_KEY must be set when STORAGE_URL is set")?,
                bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "post-images".to_string()),
            }),
            None => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").ok().filter(|v| !v.is_empty()),
            admin_emails: split_list(&env::var("ADMIN_EMAILS").unwrap_or_default())
                .into_iter()
                .map(|email| email.to_lowercase())
                .collect(),
            remote_storage,
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./uploads".to_string())
                .into(),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            ),
            tag_conflict_policy: env::var("TAG_CONFLICT_POLICY")
                .unwrap_or_else(|_| "retry_on_conflict".to_string())
                .parse()
                .context("TAG_CONFLICT_POLICY must be retry_on_conflict or fail_fast")?,
            allowed_origins: split_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }
}

/// Split a comma-separated env value, dropping blanks
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
