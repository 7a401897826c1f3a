//! [`DynamoEventStore`]: the DynamoDB implementation of [`EventStore`].
//!
//! Table layout: hash key `id`, range key `resourceId`. The latest record
//! for a key is the first item of a descending query.

use std::collections::HashMap;

use aws_sdk_dynamodb::{Client, types::AttributeValue};
use sdo_core::{
  alarm::{RecordedState, Signal, StoredStateRecord},
  store::EventStore,
};

use crate::{Error, Result};

type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone)]
pub struct DynamoEventStore {
  client: Client,
  table:  String,
}

impl DynamoEventStore {
  pub fn new(client: Client, table: impl Into<String>) -> Self {
    Self { client, table: table.into() }
  }
}

impl EventStore for DynamoEventStore {
  type Error = Error;

  async fn get_latest(&self, key: &str) -> Result<Option<StoredStateRecord>> {
    let output = self
      .client
      .query()
      .table_name(&self.table)
      .key_condition_expression("id = :id")
      .expression_attribute_values(":id", AttributeValue::S(key.to_owned()))
      .scan_index_forward(false)
      .limit(1)
      .send()
      .await
      .map_err(aws_sdk_dynamodb::Error::from)?;

    output.items().first().map(item_to_record).transpose()
  }

  async fn put(&self, record: &StoredStateRecord) -> Result<()> {
    self
      .client
      .put_item()
      .table_name(&self.table)
      .set_item(Some(record_to_item(record)))
      .send()
      .await
      .map_err(aws_sdk_dynamodb::Error::from)?;
    Ok(())
  }
}

// ─── Item mapping ────────────────────────────────────────────────────────────

pub fn record_to_item(record: &StoredStateRecord) -> Item {
  HashMap::from([
    ("id".to_owned(), AttributeValue::S(record.id.clone())),
    ("resourceId".to_owned(), AttributeValue::S(record.resource_id.clone())),
    ("appName".to_owned(), AttributeValue::S(record.app_name.clone())),
    ("bookmarked".to_owned(), AttributeValue::S(record.bookmarked.clone())),
    ("state".to_owned(), AttributeValue::S(record.state.to_string())),
    ("value".to_owned(), AttributeValue::N(record.value.value().to_string())),
  ])
}

/// Decode an item. `appName` and `bookmarked` are optional on read; older
/// items were written without them.
pub fn item_to_record(item: &Item) -> Result<StoredStateRecord> {
  let state: RecordedState = string(item, "state")?
    .parse()
    .map_err(|_| Error::invalid("item", format!("unknown state in {item:?}")))?;
  let value: i64 = number(item, "value")?
    .parse()
    .map_err(|e| Error::invalid("item", format!("value is not an integer: {e}")))?;

  Ok(StoredStateRecord {
    id: string(item, "id")?.to_owned(),
    resource_id: string(item, "resourceId")?.to_owned(),
    app_name: string(item, "appName").unwrap_or_default().to_owned(),
    bookmarked: string(item, "bookmarked").unwrap_or("N").to_owned(),
    state,
    value: Signal::try_from(value)?,
  })
}

fn string<'a>(item: &'a Item, name: &'static str) -> Result<&'a str> {
  item
    .get(name)
    .and_then(|v| v.as_s().ok())
    .map(String::as_str)
    .ok_or_else(|| Error::invalid("item", format!("missing string attribute {name}")))
}

fn number<'a>(item: &'a Item, name: &'static str) -> Result<&'a str> {
  item
    .get(name)
    .and_then(|v| v.as_n().ok())
    .map(String::as_str)
    .ok_or_else(|| Error::invalid("item", format!("missing number attribute {name}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record() -> StoredStateRecord {
    StoredStateRecord {
      id:          "ALARM_app1-service-alarm".into(),
      resource_id: "2019-12-12T06:25:41.200+0000".into(),
      app_name:    "app1".into(),
      bookmarked:  "N".into(),
      state:       RecordedState::Alarm,
      value:       Signal::Degraded,
    }
  }

  #[test]
  fn item_uses_table_attribute_names() {
    let item = record_to_item(&record());

    assert_eq!(item["id"], AttributeValue::S("ALARM_app1-service-alarm".into()));
    assert_eq!(item["resourceId"], AttributeValue::S("2019-12-12T06:25:41.200+0000".into()));
    assert_eq!(item["appName"], AttributeValue::S("app1".into()));
    assert_eq!(item["bookmarked"], AttributeValue::S("N".into()));
    assert_eq!(item["state"], AttributeValue::S("ALARM".into()));
    assert_eq!(item["value"], AttributeValue::N("1".into()));
  }

  #[test]
  fn item_decodes_back() {
    assert_eq!(item_to_record(&record_to_item(&record())).unwrap(), record());
  }

  #[test]
  fn legacy_item_without_app_name_decodes() {
    let mut item = record_to_item(&record());
    item.remove("appName");
    item.remove("bookmarked");
    item.insert("appname".into(), AttributeValue::S("app1".into()));

    let decoded = item_to_record(&item).unwrap();
    assert_eq!(decoded.app_name, "");
    assert_eq!(decoded.bookmarked, "N");
  }

  #[test]
  fn insufficient_data_state_is_rejected() {
    let mut item = record_to_item(&record());
    item.insert("state".into(), AttributeValue::S("INSUFFICIENT_DATA".into()));
    assert!(matches!(item_to_record(&item), Err(Error::Invalid { .. })));
  }

  #[test]
  fn out_of_range_value_is_rejected() {
    let mut item = record_to_item(&record());
    item.insert("value".into(), AttributeValue::N("7".into()));
    assert!(matches!(item_to_record(&item), Err(Error::Core(_))));
  }
}
