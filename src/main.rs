use anyhow::Context;
use dotenvy::dotenv;
use sysacad::config::AppConfig;
use sysacad::metrics::{init_metrics, metrics_app};
use sysacad::router::init_router;
use sysacad::state::init_app_state;
use sysacad_observability::init_logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let config = AppConfig::from_env();
    let state = init_app_state(&config).await?;

    let mut app = init_router(state);
    if let Some(handle) = init_metrics().context("failed to install metrics recorder")? {
        app = app.merge(metrics_app(handle));
    }

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!(%address, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
