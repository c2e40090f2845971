use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, middleware::CurrentTenant, state::AppState};
use crate::domain::Tenant;

#[derive(Debug, Deserialize)]
pub struct RegisterTenantRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Tenant> for TenantResponse {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id.as_uuid(),
            username: tenant.username,
            created_at: tenant.created_at,
        }
    }
}

pub async fn register_tenant(
    State(state): State<AppState>,
    Json(request): Json<RegisterTenantRequest>,
) -> Result<(StatusCode, Json<TenantResponse>), ApiError> {
    let tenant = state.tenants.register(&request.username).await?;
    Ok((StatusCode::CREATED, Json(tenant.into())))
}

pub async fn current_tenant(CurrentTenant(tenant): CurrentTenant) -> Json<TenantResponse> {
    Json(tenant.into())
}
