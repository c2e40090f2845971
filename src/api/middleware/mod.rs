mod auth;
mod logging;

pub use auth::{CurrentTenant, TENANT_HEADER};
pub use logging::request_logger;
