//! # Telemetry
//!
//! Tracing subscriber setup. Call once at process start.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,libgenius=debug,sqlx=warn";

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. Calling this twice is
/// harmless: the second call leaves the first subscriber in place.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
