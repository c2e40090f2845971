use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::{unique_blob_path, validate_relative};
use crate::domain::{ports::BlobStorage, DomainError};

/// Blob storage kept in process memory. Writes can be switched off to simulate an
/// unavailable backend.
pub struct InMemoryBlobStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    writable: AtomicBool,
}

impl InMemoryBlobStorage {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            writable: AtomicBool::new(true),
        }
    }

    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs
            .read()
            .map(|blobs| blobs.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBlobStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
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
        validate_relative(path)?;
        if !self.writable.load(Ordering::SeqCst) {
            return Err(DomainError::storage(format!(
                "storage unavailable, could not write {path}"
            )));
        }
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        blobs.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, DomainError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| DomainError::storage(format!("file not found: {path}")))
    }

    async fn delete(&self, path: &str) -> Result<(), DomainError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        blobs.remove(path);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.writable.load(Ordering::SeqCst)
    }
}
