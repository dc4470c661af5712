use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// Output goes to stderr so stdout stays free for prompt text and JSON.
pub fn init(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = match format {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    // Already installed (tests, embedding): keep the existing subscriber.
    let _ = result;
}
