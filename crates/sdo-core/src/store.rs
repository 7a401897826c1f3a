//! The leaf traits the state-change handler depends on.
//!
//! Each trait abstracts one external service: the event store holding the
//! last recorded state per alarm, the alarm-history query, and the
//! configuration parameter listing known application names. Backends live
//! in `sdo-lambda` (AWS) and `sdo-store-sqlite`; in-memory versions live in
//! [`crate::memory`].

use std::future::Future;

use crate::alarm::{HistoryEntry, StoredStateRecord};

/// Durable key-value store of [`StoredStateRecord`]s.
///
/// A key may hold several records (one per recorded transition); reads
/// return only the most recent one. Writes never delete.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The most recent record stored under `key`, if any.
  fn get_latest<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<StoredStateRecord>, Self::Error>> + Send + 'a;

  /// Persist `record`. An existing record with the same key and resource id
  /// is overwritten.
  fn put<'a>(
    &'a self,
    record: &'a StoredStateRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Read access to an alarm's state-transition history.
pub trait AlarmHistory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All known transitions for `alarm_base_name`, in whatever order the
  /// service returns them.
  fn list_history<'a>(
    &'a self,
    alarm_base_name: &'a str,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + 'a;
}

/// Source of the configured known-application names.
pub trait AppNameSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Known application names, in configured order.
  fn app_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
