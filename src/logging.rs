use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Stderr logging filtered by `RUST_LOG` (default `info`); stdout stays free
/// for the run summary.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
