//! Tracing setup for the Lambda binaries.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install a `RUST_LOG`-driven subscriber, INFO by default, without targets
/// or timestamps.
pub fn init() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_target(false)
    .without_time()
    .init();
}
