// Thin client for a bucket-oriented object storage REST API
// (upload by path, public URL for a path).

use std::time::Duration;

pub mod models;
use reqwest::{header, Client, StatusCode};

use crate::models::{ErrorResponse, UploadResponse};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage request timed out")]
    Timeout,

    #[error("Storage request failed: {0}")]
    Transport(String),

    #[error("Storage rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Failed to parse storage response: {0}")]
    Decode(String),
}

impl StorageError {
    /// Network and timeout failures may succeed when repeated; rejections won't.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Timeout | StorageError::Transport(_))
    }

    /// True when the bucket already holds an object at the requested path.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Rejected { status: 409, .. })
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StorageError::Timeout
        } else if e.is_decode() {
            StorageError::Decode(e.to_string())
        } else {
            StorageError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Base URL of the storage service, e.g. `https://project.example.co`
    pub endpoint: String,
    pub service_key: String,
    pub bucket: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StorageService {
    options: StorageOptions,
    client: Client,
}

impl StorageService {
    pub fn new(options: StorageOptions) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        Ok(Self { options, client })
    }

    pub fn bucket(&self) -> &str {
        &self.options.bucket
    }

    /// Upload an object. Existing objects are never overwritten.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadResponse, StorageError> {
        let encoded = encode_path(path)?;
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base(),
            urlencoding::encode(&self.options.bucket),
            encoded
        );

        let response = self
            .client
            .post(url)
            .headers(self.auth_headers())
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(response.json::<UploadResponse>().await?)
    }

    /// Public URL for an object in a public bucket. Pure string building.
    pub fn public_url(&self, path: &str) -> String {
        let encoded = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base(),
            urlencoding::encode(&self.options.bucket),
            encoded
        )
    }

    fn base(&self) -> &str {
        self.options.endpoint.trim_end_matches('/')
    }

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Ok(value) = format!("Bearer {}", self.options.service_key).parse() {
            headers.insert(header::AUTHORIZATION, value);
        }
        if let Ok(value) = self.options.service_key.parse() {
            headers.insert("apikey", value);
        }
        headers
    }
}

/// Percent-encode each path segment, rejecting traversal and empty paths.
fn encode_path(path: &str) -> Result<String, StorageError> {
    let segments: Vec<&str> = path.split('/').collect();

    if path.is_empty() || segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    Ok(segments
        .iter()
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/"))
}

async fn rejection(response: reqwest::Response) -> StorageError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body
            }
        });

    // Some deployments report duplicates as 400 with a 409 statusCode in the body
    let status = if status == StatusCode::BAD_REQUEST && message.contains("already exists") {
        StatusCode::CONFLICT
    } else {
        status
    };

    StorageError::Rejected {
        status: status.as_u16(),
        message,
    }
}
