//! In-memory implementations of the leaf traits.
//!
//! Used by the CLI for local replays and by tests, which rely on the call
//! counters to observe which external services an invocation touched.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    MutexGuard,
    PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use thiserror::Error;

use crate::{
  alarm::{HistoryEntry, StoredStateRecord},
  app_name::parse_app_names,
  store::{AlarmHistory, AppNameSource, EventStore},
};

/// Failure injected into an in-memory backend.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MemoryError(pub String);

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Event store ─────────────────────────────────────────────────────────────

/// Records keyed by id, each key holding its records in write order.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
  records:     Mutex<HashMap<String, Vec<StoredStateRecord>>>,
  fail_reads:  AtomicBool,
  fail_writes: AtomicBool,
  reads:       AtomicUsize,
  writes:      AtomicUsize,
}

impl MemoryEventStore {
  pub fn new() -> Self { Self::default() }

  /// A store pre-populated with `records`.
  pub fn with_records(records: impl IntoIterator<Item = StoredStateRecord>) -> Self {
    let store = Self::default();
    {
      let mut map = lock(&store.records);
      for record in records {
        map.entry(record.id.clone()).or_default().push(record);
      }
    }
    store
  }

  /// Make every subsequent read fail.
  pub fn fail_reads(self) -> Self {
    self.fail_reads.store(true, Ordering::SeqCst);
    self
  }

  /// Make every subsequent write fail.
  pub fn fail_writes(self) -> Self {
    self.fail_writes.store(true, Ordering::SeqCst);
    self
  }

  /// All records stored under `key`, oldest first.
  pub fn records(&self, key: &str) -> Vec<StoredStateRecord> {
    lock(&self.records).get(key).cloned().unwrap_or_default()
  }

  pub fn read_count(&self) -> usize { self.reads.load(Ordering::SeqCst) }

  pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }
}

impl EventStore for MemoryEventStore {
  type Error = MemoryError;

  async fn get_latest(&self, key: &str) -> Result<Option<StoredStateRecord>, MemoryError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(MemoryError(format!("read of {key} failed")));
    }
    Ok(
      lock(&self.records)
        .get(key)
        .and_then(|records| records.iter().max_by(|a, b| a.resource_id.cmp(&b.resource_id)))
        .cloned(),
    )
  }

  async fn put(&self, record: &StoredStateRecord) -> Result<(), MemoryError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(MemoryError(format!("write of {} failed", record.id)));
    }
    self.writes.fetch_add(1, Ordering::SeqCst);
    let mut map = lock(&self.records);
    let records = map.entry(record.id.clone()).or_default();
    records.retain(|r| r.resource_id != record.resource_id);
    records.push(record.clone());
    Ok(())
  }
}

// ─── Alarm history ───────────────────────────────────────────────────────────

/// A fixed history, returned for every alarm queried.
#[derive(Debug, Default)]
pub struct MemoryHistory {
  entries: Vec<HistoryEntry>,
  fail:    bool,
  queried: Mutex<Vec<String>>,
}

impl MemoryHistory {
  pub fn new(entries: Vec<HistoryEntry>) -> Self {
    Self { entries, ..Self::default() }
  }

  /// A history whose every query fails.
  pub fn failing() -> Self {
    Self { fail: true, ..Self::default() }
  }

  /// The base names queried so far, in call order.
  pub fn queried(&self) -> Vec<String> { lock(&self.queried).clone() }
}

impl AlarmHistory for MemoryHistory {
  type Error = MemoryError;

  async fn list_history(&self, alarm_base_name: &str) -> Result<Vec<HistoryEntry>, MemoryError> {
    lock(&self.queried).push(alarm_base_name.to_owned());
    if self.fail {
      return Err(MemoryError(format!("history of {alarm_base_name} unavailable")));
    }
    Ok(self.entries.clone())
  }
}

// ─── App names ───────────────────────────────────────────────────────────────

/// A fixed list of known application names.
#[derive(Debug, Default)]
pub struct StaticAppNames {
  names:   Vec<String>,
  fail:    bool,
  lookups: AtomicUsize,
}

impl StaticAppNames {
  pub fn new(names: Vec<String>) -> Self {
    Self { names, ..Self::default() }
  }

  /// Parse a comma-separated list, as stored in the configuration parameter.
  pub fn from_csv(raw: &str) -> Self { Self::new(parse_app_names(raw)) }

  /// A source whose every lookup fails.
  pub fn failing() -> Self {
    Self { fail: true, ..Self::default() }
  }

  pub fn lookup_count(&self) -> usize { self.lookups.load(Ordering::SeqCst) }
}

impl AppNameSource for StaticAppNames {
  type Error = MemoryError;

  async fn app_names(&self) -> Result<Vec<String>, MemoryError> {
    self.lookups.fetch_add(1, Ordering::SeqCst);
    if self.fail {
      return Err(MemoryError("app name parameter unavailable".into()));
    }
    Ok(self.names.clone())
  }
}
