use scan_docs::api::{create_router, AppState};
use scan_docs::infrastructure::{
    AppConfig, DocxGenerator, LocalBlobStorage, LogFormat, TesseractOcr,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(config.logging.format);

    let storage = Arc::new(LocalBlobStorage::new(&config.storage.root).await?);
    info!(root = %storage.root().display(), "Blob storage initialized");

    let ocr = Arc::new(TesseractOcr::from_config(&config.ocr));
    let generator = Arc::new(DocxGenerator::new(storage.clone()));
    info!(
        command = %config.ocr.command,
        language = %config.ocr.language,
        mode = ?config.processing.mode,
        "Processing pipeline configured"
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(config, storage, ocr, generator);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scan_docs=debug,api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
