use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemMediaStore;
use tracing::{Level, info};

use cms_server::config::AppConfig;
use cms_server::database::init_db;
use cms_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to database")?;

    let media = FilesystemMediaStore::new(
        config.storage.media_dir.clone(),
        config.storage.max_image_size,
    )
    .await
    .context("Failed to initialize media storage")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        media: Arc::new(media),
    };
    let app = cms_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
