//! `state-change-handler`: Lambda entry point for CloudWatch alarm
//! state-change events delivered through EventBridge.
//!
//! Environment: `TABLE_NAME` (required), `APP_NAMES_PARAMETER`,
//! `HISTORY_MAX_RECORDS`, `RUST_LOG`.

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use sdo_core::{Decision, StateChangeHandler, alarm::AlarmStateEvent};
use sdo_lambda::{
  LambdaConfig,
  cloudwatch::CloudWatchAlarmHistory,
  dynamo::DynamoEventStore,
  ssm::SsmAppNames,
  telemetry,
};
use serde_json::{Value, json};

type Handler = StateChangeHandler<DynamoEventStore, CloudWatchAlarmHistory, SsmAppNames>;

#[tokio::main]
async fn main() -> Result<(), Error> {
  telemetry::init();

  let cfg = LambdaConfig::from_env()?;
  let table = cfg.require_table()?.to_owned();
  let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

  let handler: Handler = StateChangeHandler::new(
    DynamoEventStore::new(aws_sdk_dynamodb::Client::new(&aws), table),
    CloudWatchAlarmHistory::new(
      aws_sdk_cloudwatch::Client::new(&aws),
      cfg.history_max_records,
    ),
    SsmAppNames::new(aws_sdk_ssm::Client::new(&aws), cfg.app_names_parameter),
  );

  let handler = &handler;
  run(service_fn(move |event: LambdaEvent<Value>| async move {
    handle(handler, event).await
  }))
  .await
}

async fn handle(handler: &Handler, event: LambdaEvent<Value>) -> Result<Value, Error> {
  let alarm = AlarmStateEvent::from_json(event.payload)?;
  let outcome = handler.handle(&alarm).await?;

  let response = match outcome.decision {
    Decision::Ignore(reason) => json!({
      "alarmName": alarm.alarm_name,
      "recorded": false,
      "reason": reason.to_string(),
    }),
    Decision::Record { .. } => json!({
      "alarmName": alarm.alarm_name,
      "recorded": true,
      "record": outcome.record,
    }),
  };
  Ok(response)
}
