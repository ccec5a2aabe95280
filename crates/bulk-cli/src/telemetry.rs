//! Logging setup for the `bulk` binary.
//!
//! Events go to stderr so stdout carries nothing but block output.
//!
//! - Filtering comes from `RUST_LOG`, defaulting to `warn`.
//! - Each event carries the thread name (`log-0`, `file-1`, ...) and a local
//!   RFC 3339 timestamp.
//!
//! Without the `tracing` feature this is a no-op.

/// Installs the global `tracing` subscriber.
pub fn init_tracing() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{EnvFilter, fmt};

        fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(true)
            .with_thread_ids(true)
            .with_timer(fmt::time::ChronoLocal::rfc_3339())
            .init();
    }
}
