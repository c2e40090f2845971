//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete implementations, and
//! every operation takes the caller's tenant explicitly.

pub mod access;
pub mod services;

pub use services::{
    DocumentDownload, DocumentPipeline, DocumentService, DocumentUpdate, FolderService,
    ProcessingMode, TenantService, Upload,
};
