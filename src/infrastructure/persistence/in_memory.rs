use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    ports::{DocumentStore, FolderStore, TenantStore},
    Document, DocumentUpdate, DomainError, Folder, Page, PageRequest, StatusChange, Tenant,
    TenantId,
};

fn lock_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::internal(e.to_string())
}

pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
        let mut store = self.documents.write().map_err(lock_error)?;
        store.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get_document(
        &self,
        tenant: TenantId,
        id: Uuid,
    ) -> Result<Option<Document>, DomainError> {
        let store = self.documents.read().map_err(lock_error)?;
        Ok(store
            .get(&id)
            .filter(|doc| doc.tenant_id == tenant)
            .cloned())
    }

    async fn update_details(
        &self,
        tenant: TenantId,
        id: Uuid,
        update: DocumentUpdate,
    ) -> Result<Option<Document>, DomainError> {
        let mut store = self.documents.write().map_err(lock_error)?;
        let Some(doc) = store.get_mut(&id).filter(|doc| doc.tenant_id == tenant) else {
            return Ok(None);
        };
        doc.apply_update(update);
        Ok(Some(doc.clone()))
    }

    async fn apply_status_change(
        &self,
        tenant: TenantId,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Option<Document>, DomainError> {
        let mut store = self.documents.write().map_err(lock_error)?;
        let Some(doc) = store.get_mut(&id).filter(|doc| doc.tenant_id == tenant) else {
            return Ok(None);
        };
        doc.apply(change)?;
        Ok(Some(doc.clone()))
    }

    async fn list_documents(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> Result<Page<Document>, DomainError> {
        let store = self.documents.read().map_err(lock_error)?;

        let mut owned: Vec<&Document> = store
            .values()
            .filter(|doc| doc.tenant_id == tenant)
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = owned.len();
        let content = owned
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .cloned()
            .collect();

        Ok(Page::new(content, page, total))
    }

    async fn delete_document(&self, tenant: TenantId, id: Uuid) -> Result<(), DomainError> {
        let mut store = self.documents.write().map_err(lock_error)?;
        if store.get(&id).is_some_and(|doc| doc.tenant_id == tenant) {
            store.remove(&id);
        }
        Ok(())
    }

    async fn detach_from_folders(
        &self,
        tenant: TenantId,
        folder_ids: &[Uuid],
    ) -> Result<usize, DomainError> {
        let mut store = self.documents.write().map_err(lock_error)?;

        let mut touched = 0;
        for doc in store.values_mut().filter(|doc| doc.tenant_id == tenant) {
            if doc.folder_id.is_some_and(|f| folder_ids.contains(&f)) {
                doc.folder_id = None;
                doc.touch();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

pub struct InMemoryFolderStore {
    folders: RwLock<HashMap<Uuid, Folder>>,
}

impl InMemoryFolderStore {
    pub fn new() -> Self {
        Self {
            folders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryFolderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FolderStore for InMemoryFolderStore {
    async fn save_folder(&self, folder: &Folder) -> Result<(), DomainError> {
        let mut store = self.folders.write().map_err(lock_error)?;
        store.insert(folder.id, folder.clone());
        Ok(())
    }

    async fn get_folder(&self, tenant: TenantId, id: Uuid) -> Result<Option<Folder>, DomainError> {
        let store = self.folders.read().map_err(lock_error)?;
        Ok(store.get(&id).filter(|f| f.tenant_id == tenant).cloned())
    }

    async fn list_folders(
        &self,
        tenant: TenantId,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<Folder>, DomainError> {
        let store = self.folders.read().map_err(lock_error)?;

        let mut folders: Vec<Folder> = store
            .values()
            .filter(|f| f.tenant_id == tenant && f.parent_id == parent_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn delete_folders(&self, tenant: TenantId, ids: &[Uuid]) -> Result<(), DomainError> {
        let mut store = self.folders.write().map_err(lock_error)?;
        store.retain(|id, f| f.tenant_id != tenant || !ids.contains(id));
        Ok(())
    }
}

pub struct InMemoryTenantStore {
    tenants: RwLock<HashMap<TenantId, Tenant>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTenantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn insert_tenant(&self, tenant: &Tenant) -> Result<(), DomainError> {
        let mut store = self.tenants.write().map_err(lock_error)?;

        if store.values().any(|t| t.username == tenant.username) {
            return Err(DomainError::conflict(format!(
                "username '{}' is already taken",
                tenant.username
            )));
        }
        store.insert(tenant.id, tenant.clone());
        Ok(())
    }

    async fn get_tenant(&self, id: TenantId) -> Result<Option<Tenant>, DomainError> {
        let store = self.tenants.read().map_err(lock_error)?;
        Ok(store.get(&id).cloned())
    }

    async fn delete_tenant(&self, id: TenantId) -> Result<(), DomainError> {
        let mut store = self.tenants.write().map_err(lock_error)?;
        store.remove(&id);
        Ok(())
    }
}
