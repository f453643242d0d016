//! Tracing setup for the binary.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `fallback_level`.
/// Output goes to stderr so it never mixes with the board on stdout.
pub fn init_tracing(fallback_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("plum_session={fallback_level},warn"))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
