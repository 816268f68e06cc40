//! Tracing subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber. The filter comes from `BALLGAME_LOG`, then `RUST_LOG`,
/// then `default_level`. Calling it twice is harmless; the second call is ignored.
pub fn init_logging(default_level: &str) {
    let filter = std::env::var("BALLGAME_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
