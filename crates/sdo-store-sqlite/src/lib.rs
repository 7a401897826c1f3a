//! SQLite backend for the alarm event store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Mirrors the DynamoDB table layout: a
//! record key plus a resource id, newest resource id wins on read.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteEventStore;

#[cfg(test)]
mod tests;
