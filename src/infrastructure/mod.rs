pub mod config;
pub mod generator;
pub mod ocr;
pub mod persistence;
pub mod storage;

pub use config::{AppConfig, LogFormat, OcrConfig};
pub use generator::{DocxGenerator, DOCX_MIME_TYPE};
pub use ocr::TesseractOcr;
pub use persistence::{InMemoryDocumentStore, InMemoryFolderStore, InMemoryTenantStore};
pub use storage::{InMemoryBlobStorage, LocalBlobStorage};
