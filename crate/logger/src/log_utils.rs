use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info";

/// Initialize the global tracing subscriber, once per process.
///
/// The filter is read from `RUST_LOG`. When it is not set, `default_value` is used
/// (or `info` when `None`).
/// Later calls are no-ops, so tests can call this freely.
pub fn log_init(default_value: Option<&str>) {
    LOG_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_value.unwrap_or(DEFAULT_FILTER)));
        tracing_setup(filter);
    });
}

fn tracing_setup(filter: EnvFilter) {
    let format = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .compact();

    // another subscriber may already be installed, e.g. by a test harness
    drop(
        tracing_subscriber::registry()
            .with(filter)
            .with(format)
            .try_init(),
    );
}
