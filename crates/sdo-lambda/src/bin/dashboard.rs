//! `dashboard-handler`: scheduled Lambda that rebuilds the State of DevOps
//! dashboard from the pipelines in the account.
//!
//! Environment: `DASHBOARD_NAME`, `RUST_LOG`.

use aws_lambda_events::event::cloudwatch_events::CloudWatchEvent;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use sdo_core::dashboard::{self, WidgetKind};
use sdo_lambda::{
  LambdaConfig,
  cloudwatch::DashboardPublisher,
  codepipeline::list_pipeline_names,
  telemetry,
};
use serde_json::{Value, json};
use tracing::{debug, info};

struct Context {
  pipelines: aws_sdk_codepipeline::Client,
  publisher: DashboardPublisher,
  region:    String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  telemetry::init();

  let cfg = LambdaConfig::from_env()?;
  let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
  let region = aws
    .region()
    .map(ToString::to_string)
    .unwrap_or_else(|| "us-east-1".to_owned());

  let ctx = Context {
    pipelines: aws_sdk_codepipeline::Client::new(&aws),
    publisher: DashboardPublisher::new(
      aws_sdk_cloudwatch::Client::new(&aws),
      cfg.dashboard_name,
    ),
    region,
  };

  let ctx = &ctx;
  run(service_fn(move |event: LambdaEvent<CloudWatchEvent>| async move {
    handle(ctx, event).await
  }))
  .await
}

async fn handle(ctx: &Context, event: LambdaEvent<CloudWatchEvent>) -> Result<Value, Error> {
  debug!(source = ?event.payload.source, "dashboard refresh triggered");

  let names = list_pipeline_names(&ctx.pipelines).await?;
  let rendered = dashboard::render(&names, &ctx.region);
  ctx.publisher.publish(&rendered).await?;

  let metrics = rendered.count(WidgetKind::Metric);
  info!(pipelines = names.len(), metrics, truncated = rendered.truncated, "published dashboard");
  Ok(json!({
    "pipelines": names.len(),
    "metricWidgets": metrics,
    "truncated": rendered.truncated,
  }))
}
