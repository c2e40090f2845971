use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, Document, DocumentUpdate, Page, PageRequest, StatusChange, TenantId,
};

/// Tenant-scoped document persistence. Lookups never return another tenant's rows.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError>;
    async fn get_document(
        &self,
        tenant: TenantId,
        id: Uuid,
    ) -> Result<Option<Document>, DomainError>;
    /// Applies `update` to the stored row without touching status or blob paths.
    /// `None` when the document does not exist for `tenant`.
    async fn update_details(
        &self,
        tenant: TenantId,
        id: Uuid,
        update: DocumentUpdate,
    ) -> Result<Option<Document>, DomainError>;
    /// Applies a lifecycle step to the stored row, atomically with respect to other
    /// writes. Fails with `InvalidState` when the stored status does not allow it.
    async fn apply_status_change(
        &self,
        tenant: TenantId,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Option<Document>, DomainError>;
    async fn list_documents(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> Result<Page<Document>, DomainError>;
    async fn delete_document(&self, tenant: TenantId, id: Uuid) -> Result<(), DomainError>;
    /// Clears the folder reference on every document of `tenant` filed under one of
    /// `folder_ids`. Returns the number of documents touched.
    async fn detach_from_folders(
        &self,
        tenant: TenantId,
        folder_ids: &[Uuid],
    ) -> Result<usize, DomainError>;
}
