//! Document processing pipeline.
//!
//! `submit` stores the upload and records a PENDING document; `process` drives it
//! through PROCESSING to COMPLETED or FAILED. Any error after PROCESSING is entered
//! is persisted as FAILED before it is returned, so no document is left PROCESSING
//! by a reported failure.

use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::application::access;
use crate::domain::{
    ports::{BlobStorage, DocumentStore, FolderStore, OcrEngine, OutputGenerator, ORIGINALS_DIR},
    Document, DomainError, StatusChange, TenantId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// The upload request runs OCR and generation before it returns.
    #[default]
    Inline,
    /// Upload returns the PENDING document; processing continues on a background task.
    Detached,
}

impl std::str::FromStr for ProcessingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "detached" => Ok(Self::Detached),
            other => Err(DomainError::invalid_argument(format!(
                "unknown processing mode '{other}'"
            ))),
        }
    }
}

/// A source file as received from the caller.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Ids of documents with an active `process` call.
#[derive(Default)]
struct InFlight(Mutex<HashSet<Uuid>>);

impl InFlight {
    fn try_claim(self: &Arc<Self>, id: Uuid) -> Option<InFlightGuard> {
        let mut ids = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        ids.insert(id).then(|| InFlightGuard {
            registry: Arc::clone(self),
            id,
        })
    }
}

struct InFlightGuard {
    registry: Arc<InFlight>,
    id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut ids = self
            .registry
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ids.remove(&self.id);
    }
}

#[derive(Clone)]
pub struct DocumentPipeline {
    documents: Arc<dyn DocumentStore>,
    folders: Arc<dyn FolderStore>,
    storage: Arc<dyn BlobStorage>,
    ocr: Arc<dyn OcrEngine>,
    generator: Arc<dyn OutputGenerator>,
    mode: ProcessingMode,
    permits: Arc<Semaphore>,
    in_flight: Arc<InFlight>,
}

impl DocumentPipeline {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        folders: Arc<dyn FolderStore>,
        storage: Arc<dyn BlobStorage>,
        ocr: Arc<dyn OcrEngine>,
        generator: Arc<dyn OutputGenerator>,
    ) -> Self {
        Self {
            documents,
            folders,
            storage,
            ocr,
            generator,
            mode: ProcessingMode::Inline,
            permits: Arc::new(Semaphore::new(4)),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Detached mode runs at most `max_concurrent` documents at a time.
    pub fn with_mode(mut self, mode: ProcessingMode, max_concurrent: usize) -> Self {
        self.mode = mode;
        self.permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
        self
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Stores the upload, records it as PENDING and starts processing. Inline mode returns
    /// the processed document (or the processing error); detached mode returns the
    /// PENDING document immediately.
    #[instrument(skip(self, upload), fields(tenant_id = %tenant, filename = %upload.filename))]
    pub async fn submit(
        &self,
        tenant: TenantId,
        upload: Upload,
        folder_id: Option<Uuid>,
    ) -> Result<Document, DomainError> {
        let name = access::validate_name("Document", &upload.filename)?;
        if upload.bytes.is_empty() {
            return Err(DomainError::invalid_argument("uploaded file is empty"));
        }

        let folder =
            access::resolve_optional_folder(self.folders.as_ref(), tenant, folder_id).await?;

        let source_path = self
            .storage
            .store(ORIGINALS_DIR, &name, &upload.bytes)
            .await?;
        let doc = Document::new(tenant, name, source_path).with_folder(folder.map(|f| f.id));

        if let Err(e) = self.documents.save_document(&doc).await {
            self.discard_blob(&doc.source_path).await;
            return Err(e);
        }
        info!(document_id = %doc.id, status = doc.status.as_str(), "document submitted");

        match self.mode {
            ProcessingMode::Inline => self.process(tenant, doc.id).await,
            ProcessingMode::Detached => {
                self.spawn_process(tenant, doc.id);
                Ok(doc)
            }
        }
    }

    /// Runs OCR and generation for a PENDING document.
    #[instrument(skip_all, fields(tenant_id = %tenant, document_id = %id))]
    pub async fn process(&self, tenant: TenantId, id: Uuid) -> Result<Document, DomainError> {
        access::resolve_document(self.documents.as_ref(), tenant, id).await?;
        let _guard = self
            .in_flight
            .try_claim(id)
            .ok_or_else(|| DomainError::conflict(format!("document {id} is already being processed")))?;

        let doc = self
            .change_status(tenant, id, StatusChange::BeginProcessing)
            .await?;
        info!(status = doc.status.as_str(), "document processing");

        let (text, output_path) = match self.extract_and_generate(&doc).await {
            Ok(result) => result,
            Err(e) => return Err(self.mark_failed(tenant, id, e).await),
        };

        let complete = StatusChange::Complete {
            text,
            output_path: output_path.clone(),
        };
        match self.change_status(tenant, id, complete).await {
            Ok(completed) => {
                info!(status = completed.status.as_str(), output_path = %output_path, "document completed");
                Ok(completed)
            }
            Err(e @ DomainError::NotFound(_)) => {
                warn!("document deleted while processing");
                self.discard_blob(&output_path).await;
                Err(e)
            }
            Err(e) => {
                self.discard_blob(&output_path).await;
                Err(self.mark_failed(tenant, id, e).await)
            }
        }
    }

    fn spawn_process(&self, tenant: TenantId, id: Uuid) {
        let pipeline = self.clone();
        tokio::spawn(async move {
            let Ok(_permit) = pipeline.permits.clone().acquire_owned().await else {
                return;
            };
            if let Err(e) = pipeline.process(tenant, id).await {
                warn!(document_id = %id, error = %e, "background processing failed");
            }
        });
    }

    async fn extract_and_generate(&self, doc: &Document) -> Result<(String, String), DomainError> {
        let source = self.storage.read(&doc.source_path).await?;

        let text = self.ocr.extract_text(&source).await.map_err(|e| match e {
            DomainError::OcrProcessing(_) => e,
            other => DomainError::ocr(other.to_string()),
        })?;

        let output_path = self
            .generator
            .generate(&text, &doc.name)
            .await
            .map_err(|e| match e {
                DomainError::Generation(_) => e,
                other => DomainError::generation(other.to_string()),
            })?;

        Ok((text, output_path))
    }

    /// Applies `change` to the stored row, so edits made during processing survive.
    async fn change_status(
        &self,
        tenant: TenantId,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Document, DomainError> {
        self.documents
            .apply_status_change(tenant, id, change)
            .await?
            .ok_or_else(|| DomainError::entity_not_found("Document", id))
    }

    /// Persists FAILED for the document and hands back `cause`.
    async fn mark_failed(&self, tenant: TenantId, id: Uuid, cause: DomainError) -> DomainError {
        error!(error = %cause, "document processing failed");

        match self
            .documents
            .apply_status_change(tenant, id, StatusChange::Fail)
            .await
        {
            Ok(Some(failed)) => info!(status = failed.status.as_str(), "document failed"),
            Ok(None) => warn!("document deleted while processing"),
            Err(e) => error!(error = %e, "could not persist FAILED status"),
        }
        cause
    }

    async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "could not remove orphaned blob");
        }
    }
}
