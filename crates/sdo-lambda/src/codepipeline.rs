//! Listing pipeline names for the dashboard.

use aws_sdk_codepipeline::Client;

use crate::Result;

/// Every pipeline name in the account and region, in listing order.
pub async fn list_pipeline_names(client: &Client) -> Result<Vec<String>> {
  let mut names = Vec::new();
  let mut next_token: Option<String> = None;

  loop {
    let output = client
      .list_pipelines()
      .set_next_token(next_token.take())
      .send()
      .await
      .map_err(aws_sdk_codepipeline::Error::from)?;

    names.extend(
      output
        .pipelines()
        .iter()
        .filter_map(|p| p.name())
        .map(str::to_owned),
    );

    match output.next_token() {
      Some(token) => next_token = Some(token.to_owned()),
      None => break,
    }
  }

  Ok(names)
}
