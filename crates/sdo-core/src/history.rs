//! Deriving an alarm's previous state from its transition history, used when
//! the event store has no record for it.

use crate::{
  alarm::{AlarmStateEvent, HistoryEntry},
  resolver::PreviousState,
};

/// Trailing qualifier that state-change alarms carry but their history
/// entries do not.
pub const ALARM_QUALIFIER: &str = "-alarm";

/// The name under which an alarm's history is queried.
pub fn history_base_name(alarm_name: &str) -> &str {
  match alarm_name.strip_suffix(ALARM_QUALIFIER) {
    Some(base) if !base.is_empty() => base,
    _ => alarm_name,
  }
}

/// The most recent concrete state preceding `event` in `entries`.
///
/// Entries may arrive in any order. Entries later than the event are
/// dropped. If the newest remaining entry is the event's own transition it
/// is skipped; `INSUFFICIENT_DATA` entries are transparent.
pub fn previous_from_history(
  event: &AlarmStateEvent,
  entries: &[HistoryEntry],
) -> PreviousState {
  let occurred_at = event.occurred_at();

  let mut preceding: Vec<&HistoryEntry> = entries
    .iter()
    .filter(|e| occurred_at.is_none_or(|at| e.timestamp <= at))
    .collect();
  preceding.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

  let own_entry = preceding
    .first()
    .is_some_and(|newest| newest.new_state == event.state);

  preceding
    .into_iter()
    .skip(usize::from(own_entry))
    .find_map(|e| e.new_state.recorded())
    .map_or(PreviousState::Absent, PreviousState::FromHistory)
}
