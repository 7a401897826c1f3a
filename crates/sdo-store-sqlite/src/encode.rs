//! Conversion between [`StoredStateRecord`] and its SQLite row.
//!
//! States are stored by their CloudWatch spelling and signals as integers.

use std::str::FromStr as _;

use sdo_core::alarm::{RecordedState, Signal, StoredStateRecord};

use crate::{Error, Result};

/// A row as read from `alarm_states`, before validation.
pub struct RawRecord {
  pub id:          String,
  pub resource_id: String,
  pub app_name:    String,
  pub bookmarked:  String,
  pub state:       String,
  pub value:       i64,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      resource_id: row.get(1)?,
      app_name:    row.get(2)?,
      bookmarked:  row.get(3)?,
      state:       row.get(4)?,
      value:       row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<StoredStateRecord> {
    let state = RecordedState::from_str(&self.state).map_err(|_| Error::Corrupt {
      id:     self.id.clone(),
      reason: format!("unknown state {:?}", self.state),
    })?;
    let value = Signal::try_from(self.value)?;

    Ok(StoredStateRecord {
      id: self.id,
      resource_id: self.resource_id,
      app_name: self.app_name,
      bookmarked: self.bookmarked,
      state,
      value,
    })
  }
}

pub fn encode_state(state: RecordedState) -> &'static str {
  match state {
    RecordedState::Ok => "OK",
    RecordedState::Alarm => "ALARM",
  }
}
