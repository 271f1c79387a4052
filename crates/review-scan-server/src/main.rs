mod logging;
mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use review_core::config::ScanConfig;
use review_scan::RpcClient;
use tower_http::trace::TraceLayer;

use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ScanConfig::from_env()?;
    logging::init(&config.log_level);

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15 * 60))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()?;

    let bearer_configured = config.semgrep_app_token.is_some();
    let backend = Arc::new(RpcClient::new(http, config.scan_tool_url.clone(), config.semgrep_app_token.clone()));

    let state = Arc::new(AppState {
        backend,
        configs: config.scan_configs.clone(),
        bearer_configured,
    });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/scan", post(routes::scan))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(addr = %addr, scan_configs = ?config.scan_configs, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
