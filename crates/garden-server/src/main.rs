use anyhow::Context;
use clap::Parser;
use garden_server::{router, MemoryStore, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::parse();

    let store = MemoryStore::open(config.data_path.clone(), config.policy())
        .context("failed to open garden store")?
        .with_wilt_after(config.wilt_after());
    let app = router(Arc::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    log::info!(
        "garden-server listening on http://{} (owner_only_updates={} messages_read_only={})",
        config.bind,
        config.owner_only_updates,
        config.messages_read_only
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("garden-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
