use async_trait::async_trait;

use crate::domain::errors::DomainError;

#[async_trait]
pub trait OutputGenerator: Send + Sync {
    /// Renders `text` into a downloadable document and returns its blob path.
    async fn generate(&self, text: &str, source_filename: &str) -> Result<String, DomainError>;
}
