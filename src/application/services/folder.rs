use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::access;
use crate::domain::{
    ports::{DocumentStore, FolderStore},
    DomainError, Folder, TenantId, ROOT_FOLDER_NAME,
};

/// Per-tenant folder forest.
///
/// Deleting a folder removes its whole subtree. Documents filed anywhere in that subtree
/// are kept and lose their folder reference.
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    documents: Arc<dyn DocumentStore>,
}

impl FolderService {
    pub fn new(folders: Arc<dyn FolderStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { folders, documents }
    }

    #[instrument(skip(self))]
    pub async fn list_roots(&self, tenant: TenantId) -> Result<Vec<Folder>, DomainError> {
        self.folders.list_folders(tenant, None).await
    }

    #[instrument(skip(self))]
    pub async fn list_children(
        &self,
        tenant: TenantId,
        parent_id: Uuid,
    ) -> Result<Vec<Folder>, DomainError> {
        let parent = access::resolve_folder(self.folders.as_ref(), tenant, parent_id).await?;
        self.folders.list_folders(tenant, Some(parent.id)).await
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        tenant: TenantId,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, DomainError> {
        let name = access::validate_name("Folder", name)?;
        let parent =
            access::resolve_optional_folder(self.folders.as_ref(), tenant, parent_id).await?;

        let folder = Folder::new(tenant, name).with_parent(parent.map(|p| p.id));
        self.folders.save_folder(&folder).await?;
        Ok(folder)
    }

    /// Seeds the default root folder for a newly registered tenant.
    #[instrument(skip(self))]
    pub async fn create_root(&self, tenant: TenantId) -> Result<Folder, DomainError> {
        let folder = Folder::new(tenant, ROOT_FOLDER_NAME);
        self.folders.save_folder(&folder).await?;
        info!(folder_id = %folder.id, "root folder created");
        Ok(folder)
    }

    /// Renames and reparents a folder. A `None` parent makes it a root.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        tenant: TenantId,
        id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, DomainError> {
        let mut folder = access::resolve_folder(self.folders.as_ref(), tenant, id).await?;

        if parent_id == Some(id) {
            return Err(DomainError::invalid_argument(
                "A folder cannot be its own parent",
            ));
        }
        let name = access::validate_name("Folder", name)?;

        if let Some(parent_id) = parent_id {
            let parent = access::resolve_folder(self.folders.as_ref(), tenant, parent_id).await?;
            self.ensure_not_ancestor(tenant, id, parent).await?;
        }

        folder.name = name;
        folder.parent_id = parent_id;
        folder.touch();
        self.folders.save_folder(&folder).await?;
        Ok(folder)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant: TenantId, id: Uuid) -> Result<(), DomainError> {
        let folder = access::resolve_folder(self.folders.as_ref(), tenant, id).await?;

        let subtree = self.subtree_ids(tenant, folder.id).await?;
        let detached = self.documents.detach_from_folders(tenant, &subtree).await?;
        self.folders.delete_folders(tenant, &subtree).await?;

        info!(folder_id = %id, folders = subtree.len(), detached, "folder deleted");
        Ok(())
    }

    /// Fails if `folder_id` appears on the ancestor chain starting at `candidate`.
    async fn ensure_not_ancestor(
        &self,
        tenant: TenantId,
        folder_id: Uuid,
        candidate: Folder,
    ) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        let mut current = Some(candidate);

        while let Some(folder) = current {
            if folder.id == folder_id {
                return Err(DomainError::invalid_argument(
                    "A folder cannot be moved into one of its own subfolders",
                ));
            }
            if !seen.insert(folder.id) {
                break;
            }
            current = match folder.parent_id {
                Some(parent_id) => self.folders.get_folder(tenant, parent_id).await?,
                None => None,
            };
        }
        Ok(())
    }

    async fn subtree_ids(&self, tenant: TenantId, root: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let mut ids = vec![root];
        let mut seen: HashSet<Uuid> = HashSet::from([root]);
        let mut next = 0;

        while next < ids.len() {
            let children = self.folders.list_folders(tenant, Some(ids[next])).await?;
            for child in children {
                if seen.insert(child.id) {
                    ids.push(child.id);
                }
            }
            next += 1;
        }
        Ok(ids)
    }
}
