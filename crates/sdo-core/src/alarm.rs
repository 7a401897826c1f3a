//! Alarm states, inbound state-change events, and the record persisted for
//! each alarm.
//!
//! Wire spellings follow CloudWatch (`OK`, `ALARM`, `INSUFFICIENT_DATA`) and
//! the stored record uses the camelCase attribute names of the event table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// Prefix of every stored record key. Names the record category, not the
/// live state of the alarm.
pub const RECORD_CATEGORY: &str = "ALARM";

/// Bookmark flag written on every record produced by the handler.
pub const NOT_BOOKMARKED: &str = "N";

// ─── States ──────────────────────────────────────────────────────────────────

/// The state an alarm reports in a CloudWatch state-change notification.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmState {
  Ok,
  Alarm,
  InsufficientData,
}

impl AlarmState {
  /// The concrete state, or `None` for `INSUFFICIENT_DATA`.
  pub fn recorded(self) -> Option<RecordedState> {
    match self {
      Self::Ok => Some(RecordedState::Ok),
      Self::Alarm => Some(RecordedState::Alarm),
      Self::InsufficientData => None,
    }
  }
}

/// A state that carries a health signal and may therefore be persisted.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordedState {
  Ok,
  Alarm,
}

impl From<RecordedState> for AlarmState {
  fn from(state: RecordedState) -> Self {
    match state {
      RecordedState::Ok => Self::Ok,
      RecordedState::Alarm => Self::Alarm,
    }
  }
}

// ─── Signal ──────────────────────────────────────────────────────────────────

/// The signed health signal graphed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Signal {
  /// `-1`: the alarm returned to OK from a known failing state.
  Recovered,
  /// `0`: first OK observation with no known predecessor.
  Baseline,
  /// `1`: the alarm is firing.
  Degraded,
}

impl Signal {
  pub fn value(self) -> i64 {
    match self {
      Self::Recovered => -1,
      Self::Baseline => 0,
      Self::Degraded => 1,
    }
  }
}

impl From<Signal> for i64 {
  fn from(signal: Signal) -> Self { signal.value() }
}

impl TryFrom<i64> for Signal {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    match value {
      -1 => Ok(Self::Recovered),
      0 => Ok(Self::Baseline),
      1 => Ok(Self::Degraded),
      other => Err(Error::InvalidSignal(other)),
    }
  }
}

// ─── Inbound event ───────────────────────────────────────────────────────────

/// The EventBridge envelope of a CloudWatch alarm state change. Only the
/// fields the handler reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AlarmStateChangeEvent {
  pub detail: AlarmDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDetail {
  pub alarm_name: String,
  pub state:      StateDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDetail {
  pub value:       AlarmState,
  pub timestamp:   String,
  #[serde(default)]
  pub reason:      Option<String>,
  #[serde(default)]
  pub reason_data: Option<String>,
}

/// A single alarm transition, flattened out of its envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmStateEvent {
  pub alarm_name:  String,
  pub state:       AlarmState,
  /// Kept verbatim; it becomes the resource id of any record written.
  pub timestamp:   String,
  pub reason:      Option<String>,
  pub reason_data: Option<String>,
}

impl AlarmStateEvent {
  pub fn new(
    alarm_name: impl Into<String>,
    state: AlarmState,
    timestamp: impl Into<String>,
  ) -> Self {
    Self {
      alarm_name: alarm_name.into(),
      state,
      timestamp: timestamp.into(),
      reason: None,
      reason_data: None,
    }
  }

  /// Decode a raw EventBridge payload, rejecting events that lack the
  /// fields the handler needs.
  pub fn from_json(payload: serde_json::Value) -> Result<Self> {
    let envelope: AlarmStateChangeEvent = serde_json::from_value(payload)
      .map_err(|e| Error::MalformedEvent(e.to_string()))?;
    Self::try_from(envelope)
  }

  /// The transition instant, when the timestamp parses.
  pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
    parse_timestamp(&self.timestamp)
  }
}

impl TryFrom<AlarmStateChangeEvent> for AlarmStateEvent {
  type Error = Error;

  fn try_from(envelope: AlarmStateChangeEvent) -> Result<Self> {
    let AlarmDetail { alarm_name, state } = envelope.detail;
    if alarm_name.trim().is_empty() {
      return Err(Error::MalformedEvent("alarmName is empty".into()));
    }
    if state.timestamp.trim().is_empty() {
      return Err(Error::MalformedEvent("state.timestamp is empty".into()));
    }
    Ok(Self {
      alarm_name,
      state: state.value,
      timestamp: state.timestamp,
      reason: state.reason,
      reason_data: state.reason_data,
    })
  }
}

/// Parse the timestamp formats CloudWatch emits: RFC 3339 and the
/// colon-less offset form (`2019-12-12T06:25:41.200+0000`).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// What was last recorded for an alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStateRecord {
  /// `"{RECORD_CATEGORY}_{alarmName}"`.
  pub id:          String,
  /// Timestamp of the recorded transition.
  pub resource_id: String,
  pub app_name:    String,
  pub bookmarked:  String,
  pub state:       RecordedState,
  pub value:       Signal,
}

/// The store key for an alarm.
pub fn record_key(alarm_name: &str) -> String {
  format!("{RECORD_CATEGORY}_{alarm_name}")
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One state transition reported by the alarm-history service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  pub timestamp: DateTime<Utc>,
  pub new_state: AlarmState,
  #[serde(default)]
  pub old_state: Option<AlarmState>,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  fn payload() -> serde_json::Value {
    json!({
      "version": "0",
      "detail-type": "CloudWatch Alarm State Change",
      "source": "aws.cloudwatch",
      "detail": {
        "alarmName": "app1-service-alarm",
        "state": {
          "value": "ALARM",
          "reason": "Threshold Crossed",
          "reasonData": "{\"version\":\"1.0\"}",
          "timestamp": "2019-12-12T06:25:41.200+0000"
        },
        "previousState": {
          "value": "INSUFFICIENT_DATA",
          "timestamp": "2019-11-18T06:57:51.679+0000"
        }
      }
    })
  }

  #[test]
  fn state_wire_names() {
    assert_eq!(AlarmState::InsufficientData.to_string(), "INSUFFICIENT_DATA");
    assert_eq!(AlarmState::from_str("OK").unwrap(), AlarmState::Ok);
    assert_eq!(RecordedState::Alarm.as_ref(), "ALARM");
    assert_eq!(
      serde_json::to_value(AlarmState::InsufficientData).unwrap(),
      json!("INSUFFICIENT_DATA")
    );
  }

  #[test]
  fn insufficient_data_has_no_recorded_state() {
    assert_eq!(AlarmState::InsufficientData.recorded(), None);
    assert_eq!(AlarmState::Ok.recorded(), Some(RecordedState::Ok));
  }

  #[test]
  fn decodes_cloudwatch_envelope() {
    let event = AlarmStateEvent::from_json(payload()).unwrap();
    assert_eq!(event.alarm_name, "app1-service-alarm");
    assert_eq!(event.state, AlarmState::Alarm);
    assert_eq!(event.timestamp, "2019-12-12T06:25:41.200+0000");
    assert_eq!(event.reason.as_deref(), Some("Threshold Crossed"));
  }

  #[test]
  fn missing_alarm_name_is_malformed() {
    let mut p = payload();
    p["detail"].as_object_mut().unwrap().remove("alarmName");
    let err = AlarmStateEvent::from_json(p).unwrap_err();
    assert!(matches!(err, Error::MalformedEvent(_)));
  }

  #[test]
  fn unknown_state_is_malformed() {
    let mut p = payload();
    p["detail"]["state"]["value"] = json!("BROKEN");
    assert!(matches!(
      AlarmStateEvent::from_json(p),
      Err(Error::MalformedEvent(_))
    ));
  }

  #[test]
  fn parses_both_timestamp_forms() {
    let expected = Utc.with_ymd_and_hms(2019, 12, 12, 6, 25, 41).unwrap()
      + chrono::Duration::milliseconds(200);
    assert_eq!(parse_timestamp("2019-12-12T06:25:41.200+0000"), Some(expected));
    assert_eq!(parse_timestamp("2019-12-12T06:25:41.200Z"), Some(expected));
    assert_eq!(parse_timestamp("yesterday"), None);
  }

  #[test]
  fn record_serialises_with_table_attribute_names() {
    let record = StoredStateRecord {
      id:          record_key("app1-service-alarm"),
      resource_id: "2019-12-12T06:25:41.200+0000".into(),
      app_name:    "app1".into(),
      bookmarked:  NOT_BOOKMARKED.into(),
      state:       RecordedState::Ok,
      value:       Signal::Recovered,
    };
    assert_eq!(
      serde_json::to_value(&record).unwrap(),
      json!({
        "id": "ALARM_app1-service-alarm",
        "resourceId": "2019-12-12T06:25:41.200+0000",
        "appName": "app1",
        "bookmarked": "N",
        "state": "OK",
        "value": -1
      })
    );
  }

  #[test]
  fn signal_rejects_out_of_range_values() {
    assert!(matches!(Signal::try_from(2), Err(Error::InvalidSignal(2))));
    assert_eq!(Signal::try_from(-1).unwrap(), Signal::Recovered);
  }
}
