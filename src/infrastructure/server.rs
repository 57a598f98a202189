// Server bootstrap - Bind, serve, and stop on Ctrl-C
use crate::infrastructure::config::ServerSettings;
use axum::Router;

pub async fn serve(router: Router, settings: &ServerSettings, name: &str) -> anyhow::Result<()> {
    let addr = settings.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting {} on {}", name, addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("{} stopped", name);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
