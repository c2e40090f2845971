use std::sync::Arc;

use crate::application::{DocumentPipeline, DocumentService, FolderService, TenantService};
use crate::domain::ports::{BlobStorage, OcrEngine, OutputGenerator};
use crate::infrastructure::{
    AppConfig, InMemoryDocumentStore, InMemoryFolderStore, InMemoryTenantStore,
};

#[derive(Clone)]
pub struct AppState {
    pub tenants: Arc<TenantService>,
    pub folders: Arc<FolderService>,
    pub documents: Arc<DocumentService>,
    pub pipeline: DocumentPipeline,
    pub storage: Arc<dyn BlobStorage>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wires the services over in-memory record stores and the given collaborators.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn BlobStorage>,
        ocr: Arc<dyn OcrEngine>,
        generator: Arc<dyn OutputGenerator>,
    ) -> Self {
        let document_store = Arc::new(InMemoryDocumentStore::new());
        let folder_store = Arc::new(InMemoryFolderStore::new());
        let tenant_store = Arc::new(InMemoryTenantStore::new());

        let folders = Arc::new(FolderService::new(
            folder_store.clone(),
            document_store.clone(),
        ));
        let tenants = Arc::new(TenantService::new(tenant_store, folders.clone()));
        let documents = Arc::new(DocumentService::new(
            document_store.clone(),
            folder_store.clone(),
            storage.clone(),
        ));
        let pipeline = DocumentPipeline::new(
            document_store,
            folder_store,
            storage.clone(),
            ocr,
            generator,
        )
        .with_mode(config.processing.mode, config.processing.max_concurrent);

        Self {
            tenants,
            folders,
            documents,
            pipeline,
            storage,
            config: Arc::new(config),
        }
    }
}
