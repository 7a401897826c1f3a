//! AWS backends and Lambda plumbing for State of DevOps alarm capture.
//!
//! The state-change handler runs over [`dynamo::DynamoEventStore`],
//! [`cloudwatch::CloudWatchAlarmHistory`] and [`ssm::SsmAppNames`]; the
//! dashboard handler lists pipelines through [`codepipeline`] and publishes
//! through [`cloudwatch::DashboardPublisher`].

pub mod cloudwatch;
pub mod codepipeline;
pub mod config;
pub mod dynamo;
pub mod error;
pub mod ssm;
pub mod telemetry;

pub use config::LambdaConfig;
pub use error::{Error, Result};
