//! `BaseObjectStorage` implementations: the remote bucket client and a local
//! directory for development.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use object_storage::StorageService;
use tokio::io::AsyncWriteExt;

use crate::common::{AppError, AppResult};
use crate::kernel::BaseObjectStorage;

// =============================================================================
// Remote bucket (object-storage crate)
// =============================================================================

/// Wrapper around StorageService that implements BaseObjectStorage
pub struct BucketStorage(pub StorageService);

impl BucketStorage {
    pub fn new(service: StorageService) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseObjectStorage for BucketStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()> {
        self.0.upload(path, bytes, content_type).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.0.public_url(path)
    }
}

// =============================================================================
// Local directory (served under /uploads)
// =============================================================================

/// Writes objects below `root`; URLs point at `{base_url}/uploads/{path}`
pub struct LocalObjectStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::validation(format!("invalid object path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BaseObjectStorage for LocalObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> AppResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Transport(e.to_string()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    AppError::Conflict(format!("object {} already exists", path))
                }
                _ => AppError::Transport(e.to_string()),
            })?;

        file.write_all(&bytes)
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/uploads/{}", self.base_url.trim_end_matches('/'), path)
    }
}
