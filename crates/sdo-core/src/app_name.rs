//! Extracting the application identifier from an alarm name.

/// Separator between the segments of an alarm name.
pub const SEGMENT_SEPARATOR: char = '-';

/// Split a comma-separated parameter value into application names, trimming
/// whitespace and dropping empty tokens.
pub fn parse_app_names(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .map(str::to_owned)
    .collect()
}

/// Everything before the first separator, or the whole name.
pub fn first_segment(alarm_name: &str) -> &str {
  alarm_name
    .split_once(SEGMENT_SEPARATOR)
    .map_or(alarm_name, |(head, _)| head)
}

/// The longest segment-aligned prefix of `alarm_name` that is a known
/// application, falling back to [`first_segment`].
///
/// Prefixes are only considered at segment boundaries, so `app1` matches
/// `app1-service-alarm` but not `app10-service-alarm`.
pub fn extract_app_name<'a>(alarm_name: &'a str, known: &[String]) -> &'a str {
  let boundaries = alarm_name
    .match_indices(SEGMENT_SEPARATOR)
    .map(|(i, _)| i)
    .chain(std::iter::once(alarm_name.len()));

  let mut candidates: Vec<&str> =
    boundaries.map(|end| &alarm_name[..end]).collect();
  candidates.reverse();

  candidates
    .into_iter()
    .find(|candidate| known.iter().any(|k| k == candidate))
    .unwrap_or_else(|| first_segment(alarm_name))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn known(raw: &str) -> Vec<String> { parse_app_names(raw) }

  #[test]
  fn parses_comma_separated_names() {
    assert_eq!(known(" app1, app2 ,,app3 "), vec!["app1", "app2", "app3"]);
    assert!(known("").is_empty());
  }

  #[test]
  fn matches_configured_prefix() {
    let names = known("app1,app2");
    assert_eq!(extract_app_name("app1-service-alarm", &names), "app1");
    assert_eq!(
      extract_app_name("app1-service-dynamodb-health-monitoring", &names),
      "app1"
    );
  }

  #[test]
  fn prefers_longest_match() {
    let names = known("flaky,flaky-service");
    assert_eq!(
      extract_app_name("flaky-service-latency-alarm", &names),
      "flaky-service"
    );
  }

  #[test]
  fn prefix_must_end_on_a_segment_boundary() {
    let names = known("app1");
    assert_eq!(extract_app_name("app10-service-alarm", &names), "app10");
  }

  #[test]
  fn whole_name_can_match() {
    let names = known("standalone");
    assert_eq!(extract_app_name("standalone", &names), "standalone");
  }

  #[test]
  fn unknown_names_fall_back_to_first_segment() {
    assert_eq!(extract_app_name("billing-api-alarm", &[]), "billing");
    assert_eq!(extract_app_name("monolith", &[]), "monolith");
  }
}
