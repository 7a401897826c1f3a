//! The transition decision: given an alarm event and what is known about the
//! alarm's previous state, decide whether anything should be recorded and
//! with which signal.
//!
//! Everything here is pure. The handler gathers the previous state from the
//! event store or the alarm history and hands it over as a
//! [`PreviousState`].
//!
//! | previous known? | current | signal |
//! |-----------------|---------|--------|
//! | yes             | OK      | -1     |
//! | yes             | ALARM   | 1      |
//! | no              | OK      | 0      |
//! | no              | ALARM   | 1      |
//!
//! `INSUFFICIENT_DATA` events, health-feed alarms and unchanged states are
//! never recorded.

use crate::alarm::{AlarmState, AlarmStateEvent, RecordedState, Signal};

/// Alarms with this suffix feed the service-health computation itself.
pub const HEALTH_FEED_SUFFIX: &str = "-service-health";

/// Where the previous state of an alarm came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousState {
  /// The last record in the event store.
  FromRecord(RecordedState),
  /// Derived from the alarm history because no record exists.
  FromHistory(RecordedState),
  /// Neither source knows a concrete previous state.
  Absent,
}

impl PreviousState {
  pub fn state(self) -> Option<RecordedState> {
    match self {
      Self::FromRecord(s) | Self::FromHistory(s) => Some(s),
      Self::Absent => None,
    }
  }
}

/// Why an event produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IgnoreReason {
  InsufficientData,
  HealthFeed,
  Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Ignore(IgnoreReason),
  Record { value: Signal, state: RecordedState },
}

/// Whether the alarm only exists to feed the service-health metrics.
pub fn is_health_feed(alarm_name: &str) -> bool {
  alarm_name.ends_with(HEALTH_FEED_SUFFIX)
}

/// The rules that reject an event on its own, before any lookup.
pub fn screen(event: &AlarmStateEvent) -> Option<IgnoreReason> {
  if event.state == AlarmState::InsufficientData {
    return Some(IgnoreReason::InsufficientData);
  }
  if is_health_feed(&event.alarm_name) {
    return Some(IgnoreReason::HealthFeed);
  }
  None
}

/// Decide what, if anything, to record for `event`.
pub fn resolve(event: &AlarmStateEvent, previous: PreviousState) -> Decision {
  if let Some(reason) = screen(event) {
    return Decision::Ignore(reason);
  }
  let Some(current) = event.state.recorded() else {
    return Decision::Ignore(IgnoreReason::InsufficientData);
  };

  let value = match (previous.state(), current) {
    (Some(prev), cur) if prev == cur => {
      return Decision::Ignore(IgnoreReason::Unchanged);
    }
    (Some(_), RecordedState::Ok) => Signal::Recovered,
    (None, RecordedState::Ok) => Signal::Baseline,
    (_, RecordedState::Alarm) => Signal::Degraded,
  };

  Decision::Record { value, state: current }
}
