use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("review_adapter={log_level},tower_http=warn").into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
