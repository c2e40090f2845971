use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{DomainError, Tenant, TenantId};

pub const TENANT_HEADER: &str = "x-tenant-id";

/// The registered tenant making the request, resolved from the `X-Tenant-Id` header.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Tenant);

impl CurrentTenant {
    pub fn id(&self) -> TenantId {
        self.0.id
    }
}

impl FromRequestParts<AppState> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing X-Tenant-Id header"))?;

        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::unauthorized("Malformed X-Tenant-Id header"))?;

        match state.tenants.get(TenantId(id)).await {
            Ok(tenant) => Ok(CurrentTenant(tenant)),
            Err(DomainError::NotFound(_)) => Err(ApiError::unauthorized("Unknown tenant")),
            Err(e) => Err(e.into()),
        }
    }
}
