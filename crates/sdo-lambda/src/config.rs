//! Environment configuration shared by the Lambda binaries.

use serde::Deserialize;

use crate::Result;

pub const DEFAULT_APP_NAMES_PARAMETER: &str = "/state-of-devops/app-names";
pub const DEFAULT_DASHBOARD_NAME: &str = "State-of-DevOps";
pub const DEFAULT_HISTORY_MAX_RECORDS: usize = 100;

/// Settings read from the function environment, e.g. `TABLE_NAME`.
#[derive(Debug, Clone, Deserialize)]
pub struct LambdaConfig {
  /// DynamoDB table holding the stored alarm states.
  pub table_name:          String,
  /// SSM parameter listing known application names.
  pub app_names_parameter: String,
  pub dashboard_name:      String,
  /// Upper bound on history entries fetched per alarm.
  pub history_max_records: usize,
}

impl LambdaConfig {
  pub fn from_env() -> Result<Self> {
    Self::from_source(config::Environment::default())
  }

  fn from_source(environment: config::Environment) -> Result<Self> {
    let cfg = config::Config::builder()
      .set_default("table_name", "")?
      .set_default("app_names_parameter", DEFAULT_APP_NAMES_PARAMETER)?
      .set_default("dashboard_name", DEFAULT_DASHBOARD_NAME)?
      .set_default("history_max_records", DEFAULT_HISTORY_MAX_RECORDS as u64)?
      .add_source(environment)
      .build()?
      .try_deserialize()?;
    Ok(cfg)
  }

  /// `table_name` is only required by the state-change handler.
  pub fn require_table(&self) -> Result<&str> {
    if self.table_name.is_empty() {
      return Err(crate::Error::invalid("configuration", "TABLE_NAME is not set"));
    }
    Ok(&self.table_name)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn env(vars: &[(&str, &str)]) -> config::Environment {
    let map: HashMap<String, String> =
      vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    config::Environment::default().source(Some(map))
  }

  #[test]
  fn defaults_apply() {
    let cfg = LambdaConfig::from_source(env(&[("TABLE_NAME", "MetricsEventStore")])).unwrap();

    assert_eq!(cfg.require_table().unwrap(), "MetricsEventStore");
    assert_eq!(cfg.app_names_parameter, DEFAULT_APP_NAMES_PARAMETER);
    assert_eq!(cfg.dashboard_name, DEFAULT_DASHBOARD_NAME);
    assert_eq!(cfg.history_max_records, DEFAULT_HISTORY_MAX_RECORDS);
  }

  #[test]
  fn environment_overrides_defaults() {
    let cfg = LambdaConfig::from_source(env(&[
      ("TABLE_NAME", "t"),
      ("APP_NAMES_PARAMETER", "/custom/apps"),
      ("HISTORY_MAX_RECORDS", "25"),
    ]))
    .unwrap();

    assert_eq!(cfg.app_names_parameter, "/custom/apps");
    assert_eq!(cfg.history_max_records, 25);
  }

  #[test]
  fn missing_table_is_reported_on_demand() {
    let cfg = LambdaConfig::from_source(env(&[])).unwrap();
    assert!(cfg.require_table().is_err());
  }
}
