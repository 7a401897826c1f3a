//! Error types for `sdo-core`.

use thiserror::Error;

/// A backend error surfaced through one of the leaf traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed alarm event: {0}")]
  MalformedEvent(String),

  #[error("alarm history query failed: {0}")]
  History(#[source] BoxError),

  #[error("app name lookup failed: {0}")]
  AppNames(#[source] BoxError),

  #[error("stored state write failed: {0}")]
  StoreWrite(#[source] BoxError),

  #[error("invalid signal value: {0}")]
  InvalidSignal(i64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
