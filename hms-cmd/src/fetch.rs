//! Submit/poll/persist workflow against the HMS web API.

use crate::{ConnectionArgs, PollArgs, QueryArgs};
use anyhow::bail;
use hms_api::{
    client::HmsClient,
    job::{Job, JobStatus},
    persist::persist_result,
    poll::poll_job,
    query::Query,
};
use log::{error, info};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Run a full HMS data request.
///
/// Builds the query, submits it, polls the job until it finishes and writes
/// the returned data to `output`. A failed job leaves `output` untouched and
/// is reported as an error.
pub async fn run_fetch(
    query_args: &QueryArgs,
    connection: &ConnectionArgs,
    poll: &PollArgs,
    output: &Path,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    info!("Starting HMS data retrieval");
    let query = query_args.to_query()?;
    let client = HmsClient::new(connection.to_config())?;
    let job_id = submit(&client, &query, query_args.from_example).await?;
    let job = poll_job(&client, &job_id, &poll.to_policy(), cancel).await?;
    write_job(&job, output)?;
    info!("HMS data retrieval completed");
    Ok(())
}

/// Submit a query and return the job id without waiting for it.
pub async fn run_submit(query_args: &QueryArgs, connection: &ConnectionArgs) -> anyhow::Result<String> {
    let query = query_args.to_query()?;
    let client = HmsClient::new(connection.to_config())?;
    submit(&client, &query, query_args.from_example).await
}

/// Poll a job submitted earlier and write its data to `output`.
pub async fn run_poll(
    job_id: &str,
    connection: &ConnectionArgs,
    poll: &PollArgs,
    output: &Path,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let client = HmsClient::new(connection.to_config())?;
    let job = poll_job(&client, job_id, &poll.to_policy(), cancel).await?;
    write_job(&job, output)
}

async fn submit(client: &HmsClient, query: &Query, from_example: bool) -> anyhow::Result<String> {
    info!(
        "Requesting {}/{} from {} for {} ({} to {}, {})",
        query.component,
        query.dataset,
        query.source,
        query.geometry,
        query.date_time_span.start_date,
        query.date_time_span.end_date,
        query.temporal_resolution
    );
    let template = if from_example {
        Some(
            client
                .fetch_request_example(&query.component, &query.dataset)
                .await?,
        )
    } else {
        None
    };
    Ok(client.submit_query(query, template.as_ref()).await?)
}

fn write_job(job: &Job, output: &Path) -> anyhow::Result<()> {
    match (job.status, job.data.as_deref()) {
        (JobStatus::Success, Some(data)) => {
            persist_result(output, data)?;
            Ok(())
        }
        (JobStatus::Failure, _) => {
            error!("HMS job {} failed to complete; no data written", job.id);
            bail!("HMS job {} failed", job.id)
        }
        (status, _) => bail!("HMS job {} ended polling in state {} without data", job.id, status),
    }
}
