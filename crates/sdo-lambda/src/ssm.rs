//! [`SsmAppNames`]: known application names from an SSM parameter.

use aws_sdk_ssm::Client;
use sdo_core::{app_name::parse_app_names, store::AppNameSource};
use tracing::debug;

use crate::{Error, Result};

/// Reads a `StringList` parameter such as `app1,app2`.
#[derive(Debug, Clone)]
pub struct SsmAppNames {
  client:    Client,
  parameter: String,
}

impl SsmAppNames {
  pub fn new(client: Client, parameter: impl Into<String>) -> Self {
    Self { client, parameter: parameter.into() }
  }
}

impl AppNameSource for SsmAppNames {
  type Error = Error;

  async fn app_names(&self) -> Result<Vec<String>> {
    let output = self
      .client
      .get_parameters()
      .names(&self.parameter)
      .send()
      .await
      .map_err(aws_sdk_ssm::Error::from)?;

    let value = output
      .parameters()
      .iter()
      .find(|p| p.name() == Some(self.parameter.as_str()))
      .or_else(|| output.parameters().first())
      .and_then(|p| p.value())
      .ok_or_else(|| Error::ParameterNotFound(self.parameter.clone()))?;

    let names = parse_app_names(value);
    debug!(parameter = %self.parameter, count = names.len(), "loaded app names");
    Ok(names)
  }
}
