use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Folder, TenantId};

#[async_trait]
pub trait FolderStore: Send + Sync {
    async fn save_folder(&self, folder: &Folder) -> Result<(), DomainError>;
    async fn get_folder(&self, tenant: TenantId, id: Uuid) -> Result<Option<Folder>, DomainError>;
    /// Folders of `tenant` whose parent is `parent_id` (roots when `None`), ordered by
    /// creation time then id.
    async fn list_folders(
        &self,
        tenant: TenantId,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<Folder>, DomainError>;
    async fn delete_folders(&self, tenant: TenantId, ids: &[Uuid]) -> Result<(), DomainError>;
}
