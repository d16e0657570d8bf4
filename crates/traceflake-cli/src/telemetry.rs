//! Log output for the CLI.
//!
//! Events go to stderr so that stdout carries only identifiers and decoded
//! fields. The level comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{EnvFilter, fmt};

pub fn init_telemetry() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(fmt::time::ChronoLocal::rfc_3339())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
