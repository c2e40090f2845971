use async_trait::async_trait;

use crate::domain::errors::DomainError;

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, image: &[u8]) -> Result<String, DomainError>;
}
