//! Print the swagger request example of a component dataset.

use crate::ConnectionArgs;
use hms_api::client::HmsClient;

/// Fetch the example request body HMS documents for `component`/`dataset`
/// and pretty-print it on stdout.
pub async fn run_example(
    component: &str,
    dataset: &str,
    connection: &ConnectionArgs,
) -> anyhow::Result<()> {
    let client = HmsClient::new(connection.to_config())?;
    let example = client.fetch_request_example(component, dataset).await?;
    println!("{}", serde_json::to_string_pretty(&example)?);
    Ok(())
}
