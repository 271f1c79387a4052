mod github;
mod logging;
mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use review_core::config::AdapterConfig;
use tower_http::trace::TraceLayer;

use github::GitHubCommentApi;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AdapterConfig::from_env()?;
    logging::init(&config.log_level);

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()?;

    let api = Arc::new(GitHubCommentApi::new(http, None, config.github_token.clone()));

    let state = Arc::new(AppState {
        api,
        default_owner: config.default_owner.clone(),
        default_repo: config.default_repo.clone(),
    });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/", post(routes::post_comment))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(addr = %addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
