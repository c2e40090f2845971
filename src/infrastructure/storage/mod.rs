//! Blob storage adapters.
//!
//! Blobs are addressed by relative paths under a storage root: uploaded sources go to
//! `originals/`, generated documents to `docs/`. Stored names are fresh UUIDs; the
//! uploader's filename only contributes its extension.

mod in_memory;
mod local;

pub use in_memory::InMemoryBlobStorage;
pub use local::LocalBlobStorage;

use std::path::{Component, Path};
use uuid::Uuid;

use crate::domain::DomainError;

pub use crate::domain::ports::{DOCS_DIR, ORIGINALS_DIR};

/// Builds `<subdirectory>/<uuid><ext>` for an uploaded file, keeping the extension
/// of `original_filename`.
pub fn unique_blob_path(subdirectory: &str, original_filename: &str) -> Result<String, DomainError> {
    if original_filename.contains("..") {
        return Err(DomainError::invalid_argument(format!(
            "filename contains invalid path sequence: {original_filename}"
        )));
    }

    let extension = original_filename
        .rfind('.')
        .map(|idx| &original_filename[idx..])
        .filter(|ext| !ext.contains(['/', '\\']))
        .unwrap_or("");

    let path = format!("{}/{}{}", subdirectory.trim_matches('/'), Uuid::new_v4(), extension);
    validate_relative(&path)?;
    Ok(path)
}

/// Rejects absolute paths and any `..` component.
pub fn validate_relative(path: &str) -> Result<(), DomainError> {
    if path.is_empty() {
        return Err(DomainError::invalid_argument("blob path is empty"));
    }
    let safe = Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe {
        return Err(DomainError::invalid_argument(format!(
            "blob path escapes storage root: {path}"
        )));
    }
    Ok(())
}
