use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, middleware::CurrentTenant, state::AppState};
use crate::domain::Folder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRequest {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            parent_id: folder.parent_id,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

fn to_responses(folders: Vec<Folder>) -> Json<Vec<FolderResponse>> {
    Json(folders.into_iter().map(FolderResponse::from).collect())
}

pub async fn list_root_folders(
    State(state): State<AppState>,
    tenant: CurrentTenant,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let folders = state.folders.list_roots(tenant.id()).await?;
    Ok(to_responses(folders))
}

pub async fn list_subfolders(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(parent_id): Path<Uuid>,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let folders = state.folders.list_children(tenant.id(), parent_id).await?;
    Ok(to_responses(folders))
}

pub async fn create_folder(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Json(request): Json<FolderRequest>,
) -> Result<(StatusCode, Json<FolderResponse>), ApiError> {
    let folder = state
        .folders
        .create(tenant.id(), &request.name, request.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(folder.into())))
}

pub async fn update_folder(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<Uuid>,
    Json(request): Json<FolderRequest>,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder = state
        .folders
        .update(tenant.id(), id, &request.name, request.parent_id)
        .await?;
    Ok(Json(folder.into()))
}

pub async fn delete_folder(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.folders.delete(tenant.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
