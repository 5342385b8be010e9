use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter env var checked before `RUST_LOG`.
pub const LOG_ENV: &str = "MARIONETTE_LOG";

fn resolve_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| EnvFilter::new(fallback),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
}

/// Install the global subscriber. A second call leaves the first one in place.
pub fn init_logging(verbose: bool, no_color: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(resolve_filter(verbose))
        .with_ansi(!no_color)
        .with_target(verbose)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
