//! Rendering the State of DevOps CloudWatch dashboard body.
//!
//! One row per pipeline: two pipeline metrics (deployment frequency and
//! lead time) and two service-health metrics (mean time between failures and
//! mean time to recover), under a header and one explanatory text widget per
//! metric column.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::Result;

/// Widget limit of a single CloudWatch dashboard, expressed in pipelines.
pub const MAX_PIPELINES: usize = 31;

pub const TRUNCATION_WARNING: &str =
  "Maximum of 31 allowed in a single dashboard.  Some pipelines will not be reported.";

/// Namespace the pipeline and service-health metrics are published under.
pub const METRIC_NAMESPACE: &str = "StateOfDevOps";

const GRID_WIDTH: u32 = 24;
const COLUMN_WIDTH: u32 = 6;
const TEXT_HEIGHT: u32 = 3;
const METRIC_HEIGHT: u32 = 6;
const PERIOD_SECONDS: u32 = 2_592_000;

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
  Text,
  Metric,
}

#[derive(Debug, Clone, Serialize)]
pub struct Widget {
  #[serde(rename = "type")]
  pub kind:       WidgetKind,
  pub x:          u32,
  pub y:          u32,
  pub width:      u32,
  pub height:     u32,
  pub properties: Value,
}

/// A dashboard body, as accepted by `PutDashboard`.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
  pub widgets:   Vec<Widget>,
  /// Whether some pipelines were left out.
  #[serde(skip)]
  pub truncated: bool,
}

impl Dashboard {
  pub fn count(&self, kind: WidgetKind) -> usize {
    self.widgets.iter().filter(|w| w.kind == kind).count()
  }

  /// The JSON string sent as the dashboard body.
  pub fn to_body(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

struct Column {
  title:       &'static str,
  explanation: &'static str,
  metric:      &'static str,
  stat:        &'static str,
  health:      bool,
}

const COLUMNS: [Column; 4] = [
  Column {
    title:       "Deployment Frequency",
    explanation: "Successful pipeline executions per period. Higher is better.",
    metric:      "SuccessCount",
    stat:        "Sum",
    health:      false,
  },
  Column {
    title:       "Lead Time",
    explanation: "Time from commit to production deploy. Lower is better.",
    metric:      "LeadTime",
    stat:        "Average",
    health:      false,
  },
  Column {
    title:       "Mean Time Between Failures",
    explanation: "Time the service stays healthy between alarms. Higher is better.",
    metric:      "MTBF",
    stat:        "Average",
    health:      true,
  },
  Column {
    title:       "Mean Time To Recover",
    explanation: "Time from a service alarm to its recovery. Lower is better.",
    metric:      "MTTR",
    stat:        "Average",
    health:      true,
  },
];

/// The service-health alarm name fed by a pipeline's service.
pub fn service_health_name(pipeline: &str) -> String {
  let service = pipeline.strip_suffix("-pipeline").unwrap_or(pipeline);
  format!("{service}-service-health")
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Render the dashboard for `pipelines` in `region`.
///
/// Duplicate names are collapsed, keeping first occurrence order. More than
/// [`MAX_PIPELINES`] pipelines are truncated with a logged warning and a
/// notice widget.
pub fn render(pipelines: &[String], region: &str) -> Dashboard {
  let mut unique: Vec<&str> = Vec::with_capacity(pipelines.len());
  for name in pipelines {
    if !unique.contains(&name.as_str()) {
      unique.push(name);
    }
  }

  let truncated = unique.len() > MAX_PIPELINES;
  if truncated {
    warn!(pipelines = unique.len(), "{TRUNCATION_WARNING}");
    unique.truncate(MAX_PIPELINES);
  }

  let mut widgets = Vec::new();
  let mut y = 0;

  widgets.push(text(
    0,
    y,
    GRID_WIDTH,
    "# State of DevOps\nPipeline throughput and service stability, one row per pipeline.",
  ));
  y += TEXT_HEIGHT;

  if truncated {
    widgets.push(text(0, y, GRID_WIDTH, &format!("**{TRUNCATION_WARNING}**")));
    y += TEXT_HEIGHT;
  }

  for (i, column) in COLUMNS.iter().enumerate() {
    let body = format!("## {}\n{}", column.title, column.explanation);
    widgets.push(text(column_x(i), y, COLUMN_WIDTH, &body));
  }
  y += TEXT_HEIGHT;

  for pipeline in unique {
    for (i, column) in COLUMNS.iter().enumerate() {
      widgets.push(metric(column_x(i), y, column, pipeline, region));
    }
    y += METRIC_HEIGHT;
  }

  Dashboard { widgets, truncated }
}

fn column_x(index: usize) -> u32 { index as u32 * COLUMN_WIDTH }

fn text(x: u32, y: u32, width: u32, markdown: &str) -> Widget {
  Widget {
    kind: WidgetKind::Text,
    x,
    y,
    width,
    height: TEXT_HEIGHT,
    properties: json!({ "markdown": markdown }),
  }
}

fn metric(x: u32, y: u32, column: &Column, pipeline: &str, region: &str) -> Widget {
  let metrics = if column.health {
    json!([[METRIC_NAMESPACE, column.metric, "service", service_health_name(pipeline)]])
  } else {
    json!([[METRIC_NAMESPACE, column.metric, "PipelineName", pipeline]])
  };

  Widget {
    kind: WidgetKind::Metric,
    x,
    y,
    width: COLUMN_WIDTH,
    height: METRIC_HEIGHT,
    properties: json!({
      "metrics": metrics,
      "view": "singleValue",
      "region": region,
      "stat": column.stat,
      "period": PERIOD_SECONDS,
      "title": format!("{pipeline} {}", column.title),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("service-{i}-pipeline")).collect()
  }

  fn metrics_of(w: &Widget) -> String { w.properties["metrics"].to_string() }

  #[test]
  fn four_metric_widgets_per_pipeline() {
    let pipelines = vec!["flaky-service-pipeline".to_string(), "stable-service-pipeline".into()];
    let d = render(&pipelines, "ap-southeast-2");

    assert!(!d.truncated);
    assert_eq!(d.count(WidgetKind::Metric), 8);
    assert_eq!(d.count(WidgetKind::Text), 5);
  }

  #[test]
  fn each_row_has_two_pipeline_and_two_health_metrics() {
    let pipelines = vec!["flaky-service-pipeline".to_string(), "stable-service-pipeline".into()];
    let d = render(&pipelines, "ap-southeast-2");
    let metric_widgets: Vec<&Widget> =
      d.widgets.iter().filter(|w| w.kind == WidgetKind::Metric).collect();

    for (row, name) in pipelines.iter().enumerate() {
      let widgets = &metric_widgets[row * 4..row * 4 + 4];
      let pipeline = widgets.iter().filter(|w| metrics_of(w).contains(name.as_str())).count();
      let health = widgets
        .iter()
        .filter(|w| metrics_of(w).contains("-service-health"))
        .count();
      assert_eq!(pipeline, 2, "pipeline metrics for {name}");
      assert_eq!(health, 2, "health metrics for {name}");
    }
  }

  #[test]
  fn duplicate_pipelines_render_once() {
    let pipelines = vec!["a-pipeline".to_string(), "a-pipeline".into(), "b-pipeline".into()];
    assert_eq!(render(&pipelines, "us-east-1").count(WidgetKind::Metric), 8);
  }

  #[test]
  fn too_many_pipelines_are_truncated() {
    let d = render(&names(50), "ap-southeast-2");

    assert!(d.truncated);
    assert_eq!(d.count(WidgetKind::Metric), MAX_PIPELINES * 4);
    assert_eq!(d.count(WidgetKind::Text), 6);
    assert!(d.widgets[1].properties["markdown"]
      .as_str()
      .unwrap()
      .contains(TRUNCATION_WARNING));
  }

  #[test]
  fn exactly_the_limit_is_not_truncated() {
    let d = render(&names(MAX_PIPELINES), "ap-southeast-2");
    assert!(!d.truncated);
    assert_eq!(d.count(WidgetKind::Text), 5);
  }

  #[test]
  fn body_is_a_widgets_document() {
    let body = render(&names(1), "ap-southeast-2").to_body().unwrap();
    let doc: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(doc.as_object().unwrap().len(), 1);
    assert_eq!(doc["widgets"][0]["type"], "text");
    assert_eq!(doc["widgets"][4]["y"], 3);
  }

  #[test]
  fn health_name_strips_pipeline_suffix() {
    assert_eq!(service_health_name("flaky-service-pipeline"), "flaky-service-service-health");
    assert_eq!(service_health_name("deployer"), "deployer-service-health");
  }
}
