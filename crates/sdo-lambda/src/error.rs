//! Error type for `sdo-lambda`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] sdo_core::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("dynamodb error: {0}")]
  Dynamo(#[from] aws_sdk_dynamodb::Error),

  #[error("cloudwatch error: {0}")]
  CloudWatch(#[from] aws_sdk_cloudwatch::Error),

  #[error("ssm error: {0}")]
  Ssm(#[from] aws_sdk_ssm::Error),

  #[error("codepipeline error: {0}")]
  CodePipeline(#[from] aws_sdk_codepipeline::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// An item or history entry lacked a field or held an unusable value.
  #[error("invalid {what}: {reason}")]
  Invalid { what: &'static str, reason: String },

  #[error("parameter {0} not found")]
  ParameterNotFound(String),
}

impl Error {
  pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
    Self::Invalid { what, reason: reason.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
