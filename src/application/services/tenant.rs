use std::sync::Arc;
use tracing::{error, info, instrument};

use super::FolderService;
use crate::domain::{ports::TenantStore, DomainError, Tenant, TenantId};

const MAX_USERNAME_CHARS: usize = 100;

pub struct TenantService {
    tenants: Arc<dyn TenantStore>,
    folders: Arc<FolderService>,
}

impl TenantService {
    pub fn new(tenants: Arc<dyn TenantStore>, folders: Arc<FolderService>) -> Self {
        Self { tenants, folders }
    }

    /// Creates the tenant and its default "Root" folder.
    #[instrument(skip(self))]
    pub async fn register(&self, username: &str) -> Result<Tenant, DomainError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::invalid_argument("username is required"));
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            return Err(DomainError::invalid_argument(format!(
                "username must be at most {MAX_USERNAME_CHARS} characters"
            )));
        }

        let tenant = Tenant::new(username);
        self.tenants.insert_tenant(&tenant).await?;
        if let Err(e) = self.folders.create_root(tenant.id).await {
            if let Err(cleanup) = self.tenants.delete_tenant(tenant.id).await {
                error!(tenant_id = %tenant.id, error = %cleanup, "could not roll back tenant");
            }
            return Err(e);
        }

        info!(tenant_id = %tenant.id, "tenant registered");
        Ok(tenant)
    }

    pub async fn get(&self, id: TenantId) -> Result<Tenant, DomainError> {
        self.tenants
            .get_tenant(id)
            .await?
            .ok_or_else(|| DomainError::entity_not_found("Tenant", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::domain::{ports::FolderStore, Folder};
    use crate::infrastructure::{InMemoryDocumentStore, InMemoryFolderStore, InMemoryTenantStore};

    struct BrokenFolderStore;

    #[async_trait]
    impl FolderStore for BrokenFolderStore {
        async fn save_folder(&self, _folder: &Folder) -> Result<(), DomainError> {
            Err(DomainError::internal("folder store offline"))
        }

        async fn get_folder(
            &self,
            _tenant: TenantId,
            _id: Uuid,
        ) -> Result<Option<Folder>, DomainError> {
            Ok(None)
        }

        async fn list_folders(
            &self,
            _tenant: TenantId,
            _parent_id: Option<Uuid>,
        ) -> Result<Vec<Folder>, DomainError> {
            Ok(Vec::new())
        }

        async fn delete_folders(&self, _tenant: TenantId, _ids: &[Uuid]) -> Result<(), DomainError> {
            Ok(())
        }
    }

    fn service() -> (TenantService, Arc<FolderService>) {
        let folders = Arc::new(FolderService::new(
            Arc::new(InMemoryFolderStore::new()),
            Arc::new(InMemoryDocumentStore::new()),
        ));
        let tenants = TenantService::new(Arc::new(InMemoryTenantStore::new()), folders.clone());
        (tenants, folders)
    }

    #[tokio::test]
    async fn test_register_seeds_root_folder() {
        let (svc, folders) = service();

        let tenant = svc.register(" alice ").await.unwrap();
        assert_eq!(tenant.username, "alice");

        let roots = folders.list_roots(tenant.id).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Root");
        assert_eq!(roots[0].parent_id, None);
        assert_eq!(svc.get(tenant.id).await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_register_rejects_blank_and_duplicate() {
        let (svc, _) = service();

        assert!(matches!(
            svc.register("   ").await,
            Err(DomainError::InvalidArgument(_))
        ));
        svc.register("bob").await.unwrap();
        assert!(matches!(
            svc.register("bob").await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_not_found() {
        let (svc, _) = service();
        assert!(matches!(
            svc.get(TenantId::new()).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_root_seeding_rolls_back_tenant() {
        let folders = Arc::new(FolderService::new(
            Arc::new(BrokenFolderStore),
            Arc::new(InMemoryDocumentStore::new()),
        ));
        let tenants = Arc::new(InMemoryTenantStore::new());
        let svc = TenantService::new(tenants.clone(), folders);

        let err = svc.register("carol").await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));

        let retry = TenantService::new(
            tenants,
            Arc::new(FolderService::new(
                Arc::new(InMemoryFolderStore::new()),
                Arc::new(InMemoryDocumentStore::new()),
            )),
        );
        let tenant = retry.register("carol").await.unwrap();
        assert_eq!(tenant.username, "carol");
    }
}
