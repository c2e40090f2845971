use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, middleware::CurrentTenant, state::AppState};
use crate::application::{DocumentUpdate, ProcessingMode, Upload};
use crate::domain::{Document, DocumentStatus, Page, PageRequest};
use crate::infrastructure::DOCX_MIME_TYPE;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub status: DocumentStatus,
    pub folder_id: Option<Uuid>,
    pub extracted_text: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            status: doc.status,
            folder_id: doc.folder_id,
            extracted_text: doc.extracted_text,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub name: String,
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// Accepts `file` plus an optional `folderId` field.
pub async fn upload_document(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let mut upload = None;
    let mut folder_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read file: {e}")))?;
                upload = Some(Upload::new(filename, bytes.to_vec()));
            }
            "folderId" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read folderId: {e}")))?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let id = Uuid::parse_str(raw)
                        .map_err(|_| ApiError::bad_request(format!("invalid folderId '{raw}'")))?;
                    folder_id = Some(id);
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("multipart field 'file' is required"))?;
    let doc = state.pipeline.submit(tenant.id(), upload, folder_id).await?;

    let status = match state.pipeline.mode() {
        ProcessingMode::Inline => StatusCode::OK,
        ProcessingMode::Detached => StatusCode::ACCEPTED,
    };
    Ok((status, Json(doc.into())))
}

pub async fn get_document(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let doc = state.documents.get(tenant.id(), id).await?;
    Ok(Json(doc.into()))
}

pub async fn list_documents(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Page<DocumentResponse>>, ApiError> {
    let request = PageRequest::new(query.page, query.size);
    let page = state.documents.list(tenant.id(), request).await?;
    Ok(Json(page.map(DocumentResponse::from)))
}

pub async fn update_document(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let update = DocumentUpdate {
        name: request.name,
        extracted_text: request.extracted_text,
        folder_id: request.folder_id,
    };
    let doc = state.documents.update(tenant.id(), id, update).await?;
    Ok(Json(doc.into()))
}

pub async fn delete_document(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.documents.delete(tenant.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_document(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let download = state.documents.download(tenant.id(), id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.filename.replace(['"', '\r', '\n'], "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    ))
}
