use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{unique_blob_path, validate_relative};
use crate::domain::{ports::BlobStorage, DomainError};

/// Filesystem-backed blob storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
}

impl LocalBlobStorage {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            DomainError::storage(format!(
                "could not create storage root {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
        validate_relative(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn store(
        &self,
        subdirectory: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, DomainError> {
        let path = unique_blob_path(subdirectory, original_filename)?;
        self.write(&path, bytes).await?;
        Ok(path)
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::storage(format!("could not create {}: {e}", parent.display()))
            })?;
        }

        fs::write(&full_path, bytes)
            .await
            .map_err(|e| DomainError::storage(format!("could not write {path}: {e}")))?;

        debug!(path, bytes = bytes.len(), "blob written");
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, DomainError> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DomainError::storage(format!("file not found: {path}"))
            } else {
                DomainError::storage(format!("could not read {path}: {e}"))
            }
        })
    }

    async fn delete(&self, path: &str) -> Result<(), DomainError> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "blob deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::storage(format!(
                "could not delete {path}: {e}"
            ))),
        }
    }

    async fn health_check(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
