mod blob_storage;
mod document_store;
mod folder_store;
mod ocr;
mod output_generator;
mod tenant_store;

pub use blob_storage::{BlobStorage, DOCS_DIR, ORIGINALS_DIR};
pub use document_store::DocumentStore;
pub use folder_store::FolderStore;
pub use ocr::OcrEngine;
pub use output_generator::OutputGenerator;
pub use tenant_store::TenantStore;
