use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::access;
use crate::domain::{
    ports::{BlobStorage, DocumentStore, FolderStore},
    Document, DocumentUpdate, DomainError, Page, PageRequest, TenantId,
};

pub const DOCX_EXTENSION: &str = ".docx";

#[derive(Debug, Clone)]
pub struct DocumentDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Tenant-scoped queries and commands over documents. Creation and processing live in
/// [`DocumentPipeline`](super::DocumentPipeline).
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    folders: Arc<dyn FolderStore>,
    storage: Arc<dyn BlobStorage>,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        folders: Arc<dyn FolderStore>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            documents,
            folders,
            storage,
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, tenant: TenantId, id: Uuid) -> Result<Document, DomainError> {
        access::resolve_document(self.documents.as_ref(), tenant, id).await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant: TenantId,
        page: PageRequest,
    ) -> Result<Page<Document>, DomainError> {
        self.documents.list_documents(tenant, page).await
    }

    #[instrument(skip(self, update), fields(name = %update.name))]
    pub async fn update(
        &self,
        tenant: TenantId,
        id: Uuid,
        update: DocumentUpdate,
    ) -> Result<Document, DomainError> {
        access::resolve_document(self.documents.as_ref(), tenant, id).await?;
        let name = access::validate_name("Document", &update.name)?;
        let folder =
            access::resolve_optional_folder(self.folders.as_ref(), tenant, update.folder_id)
                .await?;

        let update = DocumentUpdate {
            name,
            extracted_text: update.extracted_text,
            folder_id: folder.map(|f| f.id),
        };
        self.documents
            .update_details(tenant, id, update)
            .await?
            .ok_or_else(|| DomainError::entity_not_found("Document", id))
    }

    /// Removes the source and generated blobs, then the record.
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant: TenantId, id: Uuid) -> Result<(), DomainError> {
        let doc = access::resolve_document(self.documents.as_ref(), tenant, id).await?;

        self.storage.delete(&doc.source_path).await?;
        if let Some(output) = &doc.output_path {
            self.storage.delete(output).await?;
        }
        self.documents.delete_document(tenant, id).await?;

        info!(document_id = %id, "document deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn download(
        &self,
        tenant: TenantId,
        id: Uuid,
    ) -> Result<DocumentDownload, DomainError> {
        let doc = access::resolve_document(self.documents.as_ref(), tenant, id).await?;

        let output = match (&doc.output_path, doc.is_downloadable()) {
            (Some(path), true) => path,
            _ => {
                return Err(DomainError::invalid_state(
                    "Document is not ready for download",
                ))
            }
        };
        let bytes = self.storage.read(output).await?;

        Ok(DocumentDownload {
            filename: download_filename(&doc.name),
            bytes,
        })
    }
}

fn download_filename(name: &str) -> String {
    if name.ends_with(DOCX_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{DOCX_EXTENSION}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentStatus, Folder};
    use crate::infrastructure::{InMemoryBlobStorage, InMemoryDocumentStore, InMemoryFolderStore};

    struct Harness {
        service: DocumentService,
        documents: Arc<InMemoryDocumentStore>,
        folders: Arc<InMemoryFolderStore>,
        storage: Arc<InMemoryBlobStorage>,
    }

    fn harness() -> Harness {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let folders = Arc::new(InMemoryFolderStore::new());
        let storage = Arc::new(InMemoryBlobStorage::new());
        Harness {
            service: DocumentService::new(documents.clone(), folders.clone(), storage.clone()),
            documents,
            folders,
            storage,
        }
    }

    async fn completed_document(h: &Harness, tenant: TenantId) -> Document {
        let mut doc = Document::new(tenant, "receipt.png", "originals/r.png");
        h.storage.write("originals/r.png", b"png").await.unwrap();
        h.storage.write("docs/receipt_1.docx", b"docx").await.unwrap();
        doc.begin_processing().unwrap();
        doc.complete("total 12".into(), "docs/receipt_1.docx".into())
            .unwrap();
        h.documents.save_document(&doc).await.unwrap();
        doc
    }

    #[tokio::test]
    async fn test_other_tenant_cannot_touch_document() {
        let h = harness();
        let owner = TenantId::new();
        let intruder = TenantId::new();
        let doc = completed_document(&h, owner).await;

        let update = DocumentUpdate {
            name: "stolen".into(),
            ..Default::default()
        };
        assert!(matches!(
            h.service.get(intruder, doc.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            h.service.update(intruder, doc.id, update).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            h.service.delete(intruder, doc.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            h.service.download(intruder, doc.id).await,
            Err(DomainError::NotFound(_))
        ));

        let untouched = h.service.get(owner, doc.id).await.unwrap();
        assert_eq!(untouched.name, "receipt.png");
        assert!(h.storage.contains("docs/receipt_1.docx"));
    }

    #[tokio::test]
    async fn test_delete_removes_both_blobs() {
        let h = harness();
        let tenant = TenantId::new();
        let doc = completed_document(&h, tenant).await;

        h.service.delete(tenant, doc.id).await.unwrap();

        assert!(!h.storage.contains("originals/r.png"));
        assert!(!h.storage.contains("docs/receipt_1.docx"));
        assert!(matches!(
            h.service.get(tenant, doc.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_files_and_unfiles_document() {
        let h = harness();
        let tenant = TenantId::new();
        let doc = completed_document(&h, tenant).await;
        let folder = Folder::new(tenant, "Receipts");
        h.folders.save_folder(&folder).await.unwrap();

        let filed = h
            .service
            .update(
                tenant,
                doc.id,
                DocumentUpdate {
                    name: "  March receipt ".into(),
                    extracted_text: Some("corrected".into()),
                    folder_id: Some(folder.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(filed.name, "March receipt");
        assert_eq!(filed.extracted_text.as_deref(), Some("corrected"));
        assert_eq!(filed.folder_id, Some(folder.id));

        let unfiled = h
            .service
            .update(
                tenant,
                doc.id,
                DocumentUpdate {
                    name: "March receipt".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unfiled.folder_id, None);
        assert_eq!(unfiled.extracted_text.as_deref(), Some("corrected"));
    }

    #[tokio::test]
    async fn test_update_validation() {
        let h = harness();
        let tenant = TenantId::new();
        let doc = completed_document(&h, tenant).await;

        let blank = DocumentUpdate {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            h.service.update(tenant, doc.id, blank).await,
            Err(DomainError::InvalidArgument(_))
        ));

        let foreign_folder = Folder::new(TenantId::new(), "Elsewhere");
        h.folders.save_folder(&foreign_folder).await.unwrap();
        let misfiled = DocumentUpdate {
            name: "ok".into(),
            folder_id: Some(foreign_folder.id),
            ..Default::default()
        };
        assert!(matches!(
            h.service.update(tenant, doc.id, misfiled).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_download_requires_completed_document() {
        let h = harness();
        let tenant = TenantId::new();

        let pending = Document::new(tenant, "scan.png", "originals/p.png");
        h.documents.save_document(&pending).await.unwrap();
        assert!(matches!(
            h.service.download(tenant, pending.id).await,
            Err(DomainError::InvalidState(_))
        ));

        let doc = completed_document(&h, tenant).await;
        let download = h.service.download(tenant, doc.id).await.unwrap();
        assert_eq!(download.filename, "receipt.png.docx");
        assert_eq!(download.bytes, b"docx");
    }

    #[tokio::test]
    async fn test_download_with_missing_blob_is_storage_error() {
        let h = harness();
        let tenant = TenantId::new();
        let doc = completed_document(&h, tenant).await;
        h.storage.delete("docs/receipt_1.docx").await.unwrap();

        let stored = h.service.get(tenant, doc.id).await.unwrap();
        assert_eq!(stored.status, DocumentStatus::Completed);
        assert!(matches!(
            h.service.download(tenant, doc.id).await,
            Err(DomainError::Storage(_))
        ));
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(download_filename("report.docx"), "report.docx");
        assert_eq!(download_filename("scan.png"), "scan.png.docx");
    }
}
