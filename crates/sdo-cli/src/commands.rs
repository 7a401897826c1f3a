//! Subcommand implementations, kept apart from argument parsing so they can
//! be tested directly.

use std::path::Path;

use anyhow::{Context as _, Result};
use sdo_core::{
  Decision, Outcome, StateChangeHandler,
  alarm::{AlarmStateEvent, HistoryEntry, StoredStateRecord, record_key},
  dashboard::render,
  memory::{MemoryHistory, StaticAppNames},
};
use sdo_store_sqlite::SqliteEventStore;
use serde_json::{Value, json};

/// Run the event in `event_path` through the handler over `store`.
pub async fn replay(
  store: SqliteEventStore,
  event_path: &Path,
  history_path: Option<&Path>,
  app_names: &str,
) -> Result<Outcome> {
  let raw = std::fs::read_to_string(event_path)
    .with_context(|| format!("reading event file {}", event_path.display()))?;
  let payload: Value = serde_json::from_str(&raw).context("parsing event file")?;
  let event = AlarmStateEvent::from_json(payload)?;

  let entries: Vec<HistoryEntry> = match history_path {
    Some(path) => {
      let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading history file {}", path.display()))?;
      serde_json::from_str(&raw).context("parsing history file")?
    }
    None => Vec::new(),
  };

  let handler = StateChangeHandler::new(
    store,
    MemoryHistory::new(entries),
    StaticAppNames::from_csv(app_names),
  );
  Ok(handler.handle(&event).await?)
}

/// A printable description of a replay outcome.
pub fn summary(outcome: &Outcome) -> Value {
  match outcome.decision {
    Decision::Ignore(reason) => json!({ "recorded": false, "reason": reason.to_string() }),
    Decision::Record { .. } => json!({ "recorded": true, "record": outcome.record }),
  }
}

/// Stored records for `alarm`, or for every alarm when `None`.
pub async fn records(
  store: &SqliteEventStore,
  alarm: Option<&str>,
) -> Result<Vec<StoredStateRecord>> {
  let keys = match alarm {
    Some(alarm) => vec![record_key(alarm)],
    None => store.keys().await?,
  };

  let mut records = Vec::new();
  for key in keys {
    records.extend(store.list(&key).await?);
  }
  Ok(records)
}

/// The dashboard body for `pipelines`, pretty-printed.
pub fn dashboard(pipelines: &[String], region: &str) -> Result<String> {
  let rendered = render(pipelines, region);
  Ok(serde_json::to_string_pretty(&rendered)?)
}
