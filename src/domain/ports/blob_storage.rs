use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// Subdirectory for uploaded source files.
pub const ORIGINALS_DIR: &str = "originals";
/// Subdirectory for generated documents.
pub const DOCS_DIR: &str = "docs";

/// Durable blob persistence keyed by relative paths such as `originals/<uuid>.png`.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `bytes` under `subdirectory` with a fresh unique name that keeps the
    /// extension of `original_filename`. Returns the relative path.
    async fn store(
        &self,
        subdirectory: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, DomainError>;
    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), DomainError>;
    async fn read(&self, path: &str) -> Result<Vec<u8>, DomainError>;
    /// Succeeds when the blob is already gone.
    async fn delete(&self, path: &str) -> Result<(), DomainError>;
    async fn health_check(&self) -> bool;
}
