mod config;
mod error;
mod server;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use board_common::store::ContentStore;
use config::Config;
use server::NeroBoardServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting nero-board MCP server");

    let config = Config::from_env()?;
    info!(
        content_source = %config.content_source,
        announcements_file = %config.announcements_file,
        content_file = %config.content_file,
        export = config.export_dir.is_some(),
        "configuration loaded"
    );

    let store = ContentStore::new(
        config.source(),
        config.announcements_file.clone(),
        config.content_file.clone(),
    )?;
    let snapshot = store.load_snapshot().await.inspect_err(|e| {
        tracing::error!(error = %e, "failed to load board content");
    })?;
    info!(
        announcements = snapshot.announcements.announcements.len(),
        page_size = snapshot.announcements.page_size(),
        digest = %snapshot.digest,
        "board content ready"
    );

    let server = NeroBoardServer::new(snapshot, store, config);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;
    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
