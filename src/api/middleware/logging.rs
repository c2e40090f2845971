use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

use super::TENANT_HEADER;

/// Logs one line per request with the caller's tenant header, if any.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let tenant = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        warn!(%method, %path, %tenant, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        info!(%method, %path, %tenant, status = status.as_u16(), elapsed_ms, "request completed");
    }

    response
}
