use anyhow::Context;
use dotenvy::dotenv;
use escola::logging::init_tracing;
use escola::metrics::{init_metrics, metrics_app};
use escola::router::init_router;
use escola::state::init_app_state;
use escola_config::ServerConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let state = init_app_state(config.database_max_connections)
        .await
        .context("failed to initialize application state")?;

    let mut app = init_router(state);
    if let Some(handle) = init_metrics().context("failed to install metrics recorder")? {
        app = app.merge(metrics_app(handle));
    }

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!(address = %address, "Server running");
    info!("OpenAPI document at http://{}/api-docs/openapi.json", address);
    axum::serve(listener, app).await?;

    Ok(())
}
