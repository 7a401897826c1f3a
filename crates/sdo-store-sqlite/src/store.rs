//! [`SqliteEventStore`]: the SQLite implementation of [`EventStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use sdo_core::{alarm::StoredStateRecord, store::EventStore};

use crate::{
  Error, Result,
  encode::{RawRecord, encode_state},
  schema::SCHEMA,
};

const SELECT_COLUMNS: &str =
  "SELECT id, resource_id, app_name, bookmarked, state, value FROM alarm_states";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An alarm event store backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteEventStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteEventStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every record stored under `key`, oldest resource id first.
  pub async fn list(&self, key: &str) -> Result<Vec<StoredStateRecord>> {
    let key = key.to_owned();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1 ORDER BY resource_id ASC"))?;
        let rows = stmt
          .query_map(rusqlite::params![key], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  /// Distinct record keys, sorted.
  pub async fn keys(&self) -> Result<Vec<String>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT id FROM alarm_states ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteEventStore {
  type Error = Error;

  async fn get_latest(&self, key: &str) -> Result<Option<StoredStateRecord>> {
    let key = key.to_owned();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT_COLUMNS} WHERE id = ?1 ORDER BY resource_id DESC LIMIT 1"),
              rusqlite::params![key],
              RawRecord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn put(&self, record: &StoredStateRecord) -> Result<()> {
    let id          = record.id.clone();
    let resource_id = record.resource_id.clone();
    let app_name    = record.app_name.clone();
    let bookmarked  = record.bookmarked.clone();
    let state       = encode_state(record.state);
    let value       = record.value.value();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO alarm_states
             (id, resource_id, app_name, bookmarked, state, value)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id, resource_id, app_name, bookmarked, state, value],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(key = %record.id, resource_id = %record.resource_id, "stored alarm state");
    Ok(())
  }
}
