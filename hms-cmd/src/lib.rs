//! Command implementations for the HMS CLI.
//!
//! Provides subcommands for requesting HMS data end to end, or for running
//! the submit and poll halves of a job separately.

use clap::{Args, Subcommand};
use hms_api::{
    config::{
        ClientConfig, PollPolicy, DEFAULT_BASE_URL, DEFAULT_DATA_URL,
        DEFAULT_INITIAL_BACKOFF_MILLIS, DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_FILE,
        DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
        DEFAULT_SWAGGER_URL,
    },
    query::{GeometryInputs, Query, HUC_ID_KEY, LATITUDE_KEY, LONGITUDE_KEY, STATION_ID_KEY},
};
use std::{path::PathBuf, time::Duration};
use tokio_util::sync::CancellationToken;

pub mod example;
pub mod fetch;

/// What to request from HMS.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// HMS component: hydrology, meteorology or workflow
    #[arg(long, default_value = "hydrology")]
    pub component: String,

    /// Component dataset, e.g. precipitation or evapotranspiration
    #[arg(long, default_value = "precipitation")]
    pub dataset: String,

    /// Dataset source, e.g. nldas, gldas, daymet or ncei
    #[arg(long, default_value = "nldas")]
    pub source: String,

    /// Time series start date
    #[arg(long, default_value = "2010-01-01")]
    pub start_date: String,

    /// Time series end date
    #[arg(long, default_value = "2010-12-31")]
    pub end_date: String,

    /// Temporal resolution: default, daily, weekly, monthly or yearly
    #[arg(long, default_value = "daily")]
    pub timestep: String,

    /// Point latitude in decimal degrees (requires --longitude)
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<String>,

    /// Point longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<String>,

    /// NCEI station identifier
    #[arg(long)]
    pub station_id: Option<String>,

    /// Catchment identifier, sent as comID
    #[arg(long)]
    pub huc_id: Option<String>,

    /// Extra dataset parameter, e.g. --param algorithm=hamon (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Start from the swagger example body of the dataset
    #[arg(long)]
    pub from_example: bool,
}

impl QueryArgs {
    /// The geometry flags keyed the way `Geometry::from_inputs` expects.
    pub fn geometry_inputs(&self) -> GeometryInputs {
        let mut inputs = GeometryInputs::new();
        let pairs = [
            (LATITUDE_KEY, &self.latitude),
            (LONGITUDE_KEY, &self.longitude),
            (STATION_ID_KEY, &self.station_id),
            (HUC_ID_KEY, &self.huc_id),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                inputs.insert(key.to_string(), value.clone());
            }
        }
        inputs
    }

    pub fn to_query(&self) -> anyhow::Result<Query> {
        let mut query = Query::new(
            &self.component,
            &self.dataset,
            &self.source,
            &self.start_date,
            &self.end_date,
            &self.geometry_inputs(),
            &self.timestep,
        )?;
        for (key, value) in &self.params {
            query = query.with_param(key, value)?;
        }
        Ok(query)
    }
}

/// Where HMS lives.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Base URL of the submit API
    #[arg(long, env = "HMS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Job status/data endpoint
    #[arg(long, env = "HMS_DATA_URL", default_value = DEFAULT_DATA_URL)]
    pub data_url: String,

    /// Swagger document used by --from-example and the example command
    #[arg(long, env = "HMS_SWAGGER_URL", default_value = DEFAULT_SWAGGER_URL)]
    pub swagger_url: String,

    /// Per-request timeout in seconds; 0 leaves requests unbounded
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            data_url: self.data_url.clone(),
            swagger_url: self.swagger_url.clone(),
            request_timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
        }
    }
}

/// How to wait for a job.
#[derive(Args, Debug, Clone)]
pub struct PollArgs {
    /// Seconds to wait before each status request
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub interval_secs: u64,

    /// Give up after this many seconds; 0 waits forever
    #[arg(long, default_value_t = DEFAULT_POLL_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Consecutive transient failures tolerated while polling
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl PollArgs {
    pub fn to_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.interval_secs),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MILLIS),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a data request, wait for the job and write its data to a file
    Run {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        poll: PollArgs,

        /// Output path for the job data
        #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
    },

    /// Submit a data request and print the job id
    Submit {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Wait for an already submitted job and write its data to a file
    Poll {
        /// Job id returned by submit
        #[arg(long)]
        job_id: String,

        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        poll: PollArgs,

        /// Output path for the job data
        #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
    },

    /// Print the swagger example request body for a component dataset
    Example {
        #[arg(long, default_value = "hydrology")]
        component: String,

        #[arg(long, default_value = "precipitation")]
        dataset: String,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

pub async fn run(command: Command, cancel: CancellationToken) -> anyhow::Result<()> {
    match command {
        Command::Run {
            query,
            connection,
            poll,
            output,
        } => fetch::run_fetch(&query, &connection, &poll, &output, &cancel).await,
        Command::Submit { query, connection } => {
            let job_id = fetch::run_submit(&query, &connection).await?;
            println!("{job_id}");
            Ok(())
        }
        Command::Poll {
            job_id,
            connection,
            poll,
            output,
        } => fetch::run_poll(&job_id, &connection, &poll, &output, &cancel).await,
        Command::Example {
            component,
            dataset,
            connection,
        } => example::run_example(&component, &dataset, &connection).await,
    }
}
