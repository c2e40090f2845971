//! Tenant-scoped resolution of documents and folders.
//!
//! Every lookup by id goes through these helpers with the caller's tenant. A row owned
//! by another tenant is reported exactly like a missing one.

use uuid::Uuid;

use crate::domain::{
    ports::{DocumentStore, FolderStore},
    Document, DomainError, Folder, TenantId,
};

pub async fn resolve_document(
    store: &dyn DocumentStore,
    tenant: TenantId,
    id: Uuid,
) -> Result<Document, DomainError> {
    store
        .get_document(tenant, id)
        .await?
        .ok_or_else(|| DomainError::entity_not_found("Document", id))
}

pub async fn resolve_folder(
    store: &dyn FolderStore,
    tenant: TenantId,
    id: Uuid,
) -> Result<Folder, DomainError> {
    store
        .get_folder(tenant, id)
        .await?
        .ok_or_else(|| DomainError::entity_not_found("Folder", id))
}

pub async fn resolve_optional_folder(
    store: &dyn FolderStore,
    tenant: TenantId,
    id: Option<Uuid>,
) -> Result<Option<Folder>, DomainError> {
    match id {
        Some(id) => resolve_folder(store, tenant, id).await.map(Some),
        None => Ok(None),
    }
}

/// Trims `name` and checks it is 1..=255 characters.
pub fn validate_name(kind: &str, name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::invalid_argument(format!("{kind} name is required")));
    }
    if name.chars().count() > 255 {
        return Err(DomainError::invalid_argument(format!(
            "{kind} name must be between 1 and 255 characters"
        )));
    }
    Ok(name.to_string())
}
