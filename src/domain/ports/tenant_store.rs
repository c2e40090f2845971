use async_trait::async_trait;

use crate::domain::{errors::DomainError, Tenant, TenantId};

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Inserts a new tenant; fails with `Conflict` when the username is taken.
    async fn insert_tenant(&self, tenant: &Tenant) -> Result<(), DomainError>;
    async fn get_tenant(&self, id: TenantId) -> Result<Option<Tenant>, DomainError>;
    async fn delete_tenant(&self, id: TenantId) -> Result<(), DomainError>;
}
