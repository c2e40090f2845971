mod document;
mod folder;
mod pipeline;
mod tenant;

pub use crate::domain::DocumentUpdate;
pub use document::{DocumentDownload, DocumentService};
pub use folder::FolderService;
pub use pipeline::{DocumentPipeline, ProcessingMode, Upload};
pub use tenant::TenantService;
