//! Poll a submitted job until HMS reports `SUCCESS` or `FAILURE`.
//!
//! Every status request is preceded by the policy interval. Transient
//! failures are retried after an exponential backoff delay, which takes the
//! place of the interval for that retry. The whole phase is bounded
//! by the policy timeout, and the cancellation token interrupts any sleep.

use crate::{
    client::HmsApi,
    config::PollPolicy,
    error::{HmsError, Result},
    job::{Job, JobStatus},
};
use log::{info, warn};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Poll `job_id` until it reaches a terminal status.
///
/// Returns the terminal job: `Success` with `data` set, or `Failure` without.
pub async fn poll_job<A>(
    api: &A,
    job_id: &str,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Job>
where
    A: HmsApi + ?Sized,
{
    let started = Instant::now();
    let polling = poll_until_terminal(api, job_id, policy, cancel);
    match policy.timeout {
        Some(limit) => tokio::time::timeout(limit, polling)
            .await
            .map_err(|_| HmsError::Timeout {
                job_id: job_id.to_string(),
                elapsed: started.elapsed(),
            })?,
        None => polling.await,
    }
}

async fn poll_until_terminal<A>(
    api: &A,
    job_id: &str,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Job>
where
    A: HmsApi + ?Sized,
{
    let mut job = Job::submitted(job_id);
    let mut failures: u32 = 0;
    let mut polls: u32 = 0;

    info!("Checking HMS data API for status of job {}", job_id);
    let mut wait = policy.interval;
    loop {
        pause(wait, job_id, cancel).await?;
        wait = policy.interval;
        polls += 1;

        match api.fetch_status(job_id).await {
            Ok(response) => {
                failures = 0;
                info!("Job {} status after poll {}: {}", job_id, polls, response.raw_status);
                job.apply(response);
            }
            Err(e) if e.is_transient() && failures < policy.max_retries => {
                failures += 1;
                // the backoff replaces the regular interval before the retry
                wait = policy.backoff(failures);
                warn!(
                    "Attempt {}/{}: status request for job {} failed: {}",
                    failures, policy.max_retries, job_id, e
                );
                info!(
                    "Sleeping for {} milliseconds before retry for job {}",
                    wait.as_millis(),
                    job_id
                );
                continue;
            }
            Err(e) => return Err(e),
        }

        match job.status {
            JobStatus::Success => {
                info!("Data successfully downloaded for job {}", job_id);
                return Ok(job);
            }
            JobStatus::Failure => {
                warn!("Job {} failed to complete", job_id);
                return Ok(job);
            }
            JobStatus::Pending => {}
        }
    }
}

/// Sleep for `duration` unless the token fires first.
async fn pause(duration: Duration, job_id: &str, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HmsError::Cancelled(job_id.to_string())),
        _ = sleep(duration) => Ok(()),
    }
}
