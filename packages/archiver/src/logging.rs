use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the console subscriber. `RUST_LOG` overrides the default level.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,archiver=info,midjourney_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
