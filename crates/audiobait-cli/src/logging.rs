//! Log output setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Filter comes from `RUST_LOG`, default `info`.
///
/// Logs go to stderr so command output on stdout stays parseable.
pub fn init(timestamps: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if timestamps {
        builder.init();
    } else {
        // The service journal stamps lines itself.
        builder.without_time().init();
    }
}
