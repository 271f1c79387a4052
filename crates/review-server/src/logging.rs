use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the process-wide tracing subscriber: an `EnvFilter` seeded
/// from `RUST_LOG` if set, falling back to `log_level` scoped to this
/// crate's own targets, plus a stdout `fmt` layer.
pub fn init(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("review_server={log_level},review_core={log_level},review_clients={log_level},tower_http=warn").into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
