//! Error type for `sdo-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] sdo_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored column held a value the domain types cannot represent.
  #[error("corrupt record {id}: {reason}")]
  Corrupt { id: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
