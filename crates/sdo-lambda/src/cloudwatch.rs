//! CloudWatch: alarm history for the state-change handler and dashboard
//! publishing for the dashboard handler.

use aws_sdk_cloudwatch::{
  Client,
  types::{AlarmHistoryItem, HistoryItemType, ScanBy},
};
use chrono::{DateTime, Utc};
use sdo_core::{
  alarm::{AlarmState, HistoryEntry},
  dashboard::Dashboard,
  store::AlarmHistory,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Result};

// ─── Alarm history ───────────────────────────────────────────────────────────

/// `DescribeAlarmHistory` over `StateUpdate` items, newest first.
#[derive(Debug, Clone)]
pub struct CloudWatchAlarmHistory {
  client:      Client,
  max_records: usize,
}

impl CloudWatchAlarmHistory {
  pub fn new(client: Client, max_records: usize) -> Self {
    Self { client, max_records: max_records.max(1) }
  }
}

impl AlarmHistory for CloudWatchAlarmHistory {
  type Error = Error;

  async fn list_history(&self, alarm_base_name: &str) -> Result<Vec<HistoryEntry>> {
    let mut entries = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
      let page_size = (self.max_records - entries.len()).min(100) as i32;
      let output = self
        .client
        .describe_alarm_history()
        .alarm_name(alarm_base_name)
        .history_item_type(HistoryItemType::StateUpdate)
        .scan_by(ScanBy::TimestampDescending)
        .max_records(page_size)
        .set_next_token(next_token.take())
        .send()
        .await
        .map_err(aws_sdk_cloudwatch::Error::from)?;

      for item in output.alarm_history_items() {
        match history_entry(item) {
          Ok(entry) => entries.push(entry),
          Err(e) => warn!(alarm = alarm_base_name, error = %e, "skipping history item"),
        }
      }

      next_token = output.next_token().map(str::to_owned);
      if next_token.is_none() || entries.len() >= self.max_records {
        break;
      }
    }

    debug!(alarm = alarm_base_name, entries = entries.len(), "fetched alarm history");
    Ok(entries)
  }
}

/// The state pair inside a `StateUpdate` item's `HistoryData` JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryData {
  new_state: StateData,
  #[serde(default)]
  old_state: Option<StateData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateData {
  #[serde(default)]
  state_value: Option<AlarmState>,
}

fn history_entry(item: &AlarmHistoryItem) -> Result<HistoryEntry> {
  let timestamp = item
    .timestamp()
    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos()))
    .ok_or_else(|| Error::invalid("history item", "missing timestamp"))?;
  let data = item
    .history_data()
    .ok_or_else(|| Error::invalid("history item", "missing HistoryData"))?;
  parse_history_data(timestamp, data)
}

/// Decode the `HistoryData` JSON of a `StateUpdate` item.
pub fn parse_history_data(timestamp: DateTime<Utc>, data: &str) -> Result<HistoryEntry> {
  let data: HistoryData = serde_json::from_str(data)?;
  let new_state = data
    .new_state
    .state_value
    .ok_or_else(|| Error::invalid("history item", "newState has no stateValue"))?;

  Ok(HistoryEntry {
    timestamp,
    new_state,
    old_state: data.old_state.and_then(|s| s.state_value),
  })
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Publishes rendered dashboards with `PutDashboard`.
#[derive(Debug, Clone)]
pub struct DashboardPublisher {
  client: Client,
  name:   String,
}

impl DashboardPublisher {
  pub fn new(client: Client, name: impl Into<String>) -> Self {
    Self { client, name: name.into() }
  }

  pub async fn publish(&self, dashboard: &Dashboard) -> Result<()> {
    let output = self
      .client
      .put_dashboard()
      .dashboard_name(&self.name)
      .dashboard_body(dashboard.to_body()?)
      .send()
      .await
      .map_err(aws_sdk_cloudwatch::Error::from)?;

    for message in output.dashboard_validation_messages() {
      warn!(
        dashboard = %self.name,
        path = message.data_path().unwrap_or_default(),
        message = message.message().unwrap_or_default(),
        "dashboard validation message"
      );
    }
    Ok(())
  }
}
