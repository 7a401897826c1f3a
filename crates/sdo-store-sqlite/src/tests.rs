//! Integration tests for `SqliteEventStore` against an in-memory database.

use sdo_core::{
  StateChangeHandler,
  alarm::{AlarmState, AlarmStateEvent, RecordedState, Signal, StoredStateRecord, record_key},
  memory::{MemoryHistory, StaticAppNames},
  store::EventStore,
};

use crate::SqliteEventStore;

async fn store() -> SqliteEventStore {
  SqliteEventStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(alarm: &str, resource_id: &str, state: RecordedState, value: Signal) -> StoredStateRecord {
  StoredStateRecord {
    id: record_key(alarm),
    resource_id: resource_id.into(),
    app_name: "app1".into(),
    bookmarked: "N".into(),
    state,
    value,
  }
}

// ─── Reads and writes ────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_returns_none() {
  let s = store().await;
  assert!(s.get_latest("ALARM_nothing").await.unwrap().is_none());
}

#[tokio::test]
async fn put_and_get_roundtrip() {
  let s = store().await;
  let r = record("app1-service-alarm", "2019-12-12T06:25:41.200+0000", RecordedState::Ok, Signal::Recovered);

  s.put(&r).await.unwrap();

  assert_eq!(s.get_latest(&r.id).await.unwrap(), Some(r));
}

#[tokio::test]
async fn latest_resource_id_wins() {
  let s = store().await;
  let older = record("a-alarm", "2019-01-01T00:00:00.000+0000", RecordedState::Alarm, Signal::Degraded);
  let newer = record("a-alarm", "2019-02-01T00:00:00.000+0000", RecordedState::Ok, Signal::Recovered);

  s.put(&newer).await.unwrap();
  s.put(&older).await.unwrap();

  assert_eq!(s.get_latest(&older.id).await.unwrap(), Some(newer));
  assert_eq!(s.list(&older.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn same_resource_id_is_overwritten() {
  let s = store().await;
  let first = record("a-alarm", "2019-01-01T00:00:00.000+0000", RecordedState::Ok, Signal::Baseline);
  let second = record("a-alarm", "2019-01-01T00:00:00.000+0000", RecordedState::Alarm, Signal::Degraded);

  s.put(&first).await.unwrap();
  s.put(&second).await.unwrap();

  assert_eq!(s.list(&first.id).await.unwrap(), vec![second]);
}

#[tokio::test]
async fn keys_are_distinct_and_sorted() {
  let s = store().await;
  s.put(&record("b-alarm", "1", RecordedState::Ok, Signal::Baseline)).await.unwrap();
  s.put(&record("a-alarm", "1", RecordedState::Ok, Signal::Baseline)).await.unwrap();
  s.put(&record("a-alarm", "2", RecordedState::Alarm, Signal::Degraded)).await.unwrap();

  assert_eq!(s.keys().await.unwrap(), vec!["ALARM_a-alarm", "ALARM_b-alarm"]);
}

// ─── Handler over SQLite ─────────────────────────────────────────────────────

#[tokio::test]
async fn handler_records_then_deduplicates() {
  let handler = StateChangeHandler::new(
    store().await,
    MemoryHistory::default(),
    StaticAppNames::from_csv("app1,app2"),
  );
  let first = AlarmStateEvent::new("app1-service-alarm", AlarmState::Alarm, "2019-12-12T06:25:41.200+0000");
  let repeat = AlarmStateEvent::new("app1-service-alarm", AlarmState::Alarm, "2019-12-12T07:00:00.000+0000");
  let recovery = AlarmStateEvent::new("app1-service-alarm", AlarmState::Ok, "2019-12-12T08:00:00.000+0000");

  handler.handle(&first).await.unwrap();
  handler.handle(&repeat).await.unwrap();
  handler.handle(&recovery).await.unwrap();

  let records = handler.store().list(&record_key("app1-service-alarm")).await.unwrap();
  let values: Vec<i64> = records.iter().map(|r| r.value.value()).collect();
  assert_eq!(values, vec![1, -1]);
  assert_eq!(handler.app_names().lookup_count(), 1);
}
