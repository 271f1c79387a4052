mod logging;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use review_clients::{http::build_client, McpCommentPoster, PrAgentClient, ScanServiceClient, SynthesisServiceClient};
use review_core::config::Config;
use review_core::pipeline::Pipeline;
use tower_http::trace::TraceLayer;

use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log_level);

    let http = build_client(config.http_timeout_minutes);

    let pipeline = Arc::new(Pipeline {
        snapshotter: Arc::new(review_core::git::GitSnapshotter {
            scratch_root: config.scratch_root.clone(),
            git_host: config.git_host.clone(),
        }),
        authoring: Arc::new(PrAgentClient::new(http.clone(), config.pr_agent_url.clone())),
        scan: Arc::new(ScanServiceClient::new(http.clone(), config.semgrep_service_url.clone())),
        synthesis: Arc::new(SynthesisServiceClient::new(http.clone(), config.summarizer_url.clone())),
        comment_poster: Arc::new(McpCommentPoster::new(http.clone(), config.github_mcp_url.clone())),
    });

    let state = Arc::new(AppState {
        pipeline,
        pipeline_timeout: Duration::from_secs(config.pipeline_timeout_minutes * 60),
    });

    let app = Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/webhook", post(routes::webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(addr = %config.listen_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
