//! [`StateChangeHandler`]: read the previous state, decide, and record.

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  alarm::{AlarmStateEvent, NOT_BOOKMARKED, StoredStateRecord, record_key},
  app_name::{extract_app_name, first_segment},
  history::{history_base_name, previous_from_history},
  resolver::{self, Decision, IgnoreReason, PreviousState},
  store::{AlarmHistory, AppNameSource, EventStore},
};

/// The result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
  pub decision: Decision,
  /// The record written, when the decision was to record.
  pub record:   Option<StoredStateRecord>,
}

impl Outcome {
  fn ignored(reason: IgnoreReason) -> Self {
    Self { decision: Decision::Ignore(reason), record: None }
  }
}

/// Orchestrates one alarm state-change invocation over injected backends.
///
/// Holds no state between invocations; concurrent invocations for the same
/// alarm may both write, and the store keeps the last write.
#[derive(Debug)]
pub struct StateChangeHandler<S, H, A> {
  store:     S,
  history:   H,
  app_names: A,
}

impl<S, H, A> StateChangeHandler<S, H, A>
where
  S: EventStore,
  H: AlarmHistory,
  A: AppNameSource,
{
  pub fn new(store: S, history: H, app_names: A) -> Self {
    Self { store, history, app_names }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn history(&self) -> &H { &self.history }

  pub fn app_names(&self) -> &A { &self.app_names }

  /// Handle one alarm transition.
  ///
  /// A failed read of the stored record is logged and treated as "no
  /// record". History, configuration and write failures are returned.
  #[tracing::instrument(
    skip_all,
    fields(alarm = %event.alarm_name, state = %event.state)
  )]
  pub async fn handle(&self, event: &AlarmStateEvent) -> Result<Outcome> {
    if let Some(reason) = resolver::screen(event) {
      debug!(%reason, "ignoring event");
      return Ok(Outcome::ignored(reason));
    }

    let key = record_key(&event.alarm_name);
    let stored = match self.store.get_latest(&key).await {
      Ok(stored) => stored,
      Err(e) => {
        warn!(%key, error = %e, "stored state read failed, falling back to history");
        None
      }
    };

    let (previous, app_name) = match stored {
      Some(record) => {
        debug!(%key, previous = %record.state, "found stored state");
        let app_name = if record.app_name.is_empty() {
          first_segment(&event.alarm_name).to_owned()
        } else {
          record.app_name
        };
        (PreviousState::FromRecord(record.state), app_name)
      }
      None => self.resolve_without_record(event).await?,
    };

    let (value, state) = match resolver::resolve(event, previous) {
      Decision::Ignore(reason) => {
        debug!(%reason, ?previous, "ignoring event");
        return Ok(Outcome::ignored(reason));
      }
      Decision::Record { value, state } => (value, state),
    };

    let record = StoredStateRecord {
      id: key,
      resource_id: event.timestamp.clone(),
      app_name,
      bookmarked: NOT_BOOKMARKED.to_owned(),
      state,
      value,
    };
    self
      .store
      .put(&record)
      .await
      .map_err(|e| Error::StoreWrite(Box::new(e)))?;

    info!(
      key = %record.id,
      app = %record.app_name,
      value = value.value(),
      ?previous,
      "recorded alarm state"
    );
    Ok(Outcome { decision: Decision::Record { value, state }, record: Some(record) })
  }

  /// The previous state from history, and the app name from configuration.
  async fn resolve_without_record(
    &self,
    event: &AlarmStateEvent,
  ) -> Result<(PreviousState, String)> {
    let base_name = history_base_name(&event.alarm_name);
    let entries = self
      .history
      .list_history(base_name)
      .await
      .map_err(|e| Error::History(Box::new(e)))?;
    let previous = previous_from_history(event, &entries);
    debug!(base_name, entries = entries.len(), ?previous, "derived previous state from history");

    let known = self
      .app_names
      .app_names()
      .await
      .map_err(|e| Error::AppNames(Box::new(e)))?;
    let app_name = extract_app_name(&event.alarm_name, &known).to_owned();

    Ok((previous, app_name))
  }
}
