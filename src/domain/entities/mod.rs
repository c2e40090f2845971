mod document;
mod folder;
mod page;
mod tenant;

pub use document::{Document, DocumentStatus, DocumentUpdate, StatusChange};
pub use folder::{Folder, ROOT_FOLDER_NAME};
pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use tenant::{Tenant, TenantId};
