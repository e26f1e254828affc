//! HTTP access to the HMS submit, data and swagger endpoints.

use crate::{
    config::ClientConfig,
    error::{HmsError, Result},
    job::{parse_job_id, StatusResponse, JOB_ID_FIELD},
    query::Query,
    swagger::extract_request_example,
};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde_json::Value;

/// The two calls a job needs: create it, then ask how it is doing.
#[async_trait]
pub trait HmsApi: Send + Sync {
    /// POST a request body and return the job identifier the service assigned.
    async fn submit(&self, component: &str, dataset: &str, body: &Value) -> Result<String>;

    /// GET the current status (and, once finished, the data) of a job.
    async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse>;
}

/// reqwest backed [`HmsApi`].
#[derive(Debug, Clone)]
pub struct HmsClient {
    client: Client,
    config: ClientConfig,
}

impl HmsClient {
    pub fn new(config: ClientConfig) -> Result<HmsClient> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(HmsClient { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Serialize and submit a query, optionally on top of a template body.
    pub async fn submit_query(&self, query: &Query, template: Option<&Value>) -> Result<String> {
        let body = query.request_body(template)?;
        self.submit(&query.component, &query.dataset, &body).await
    }

    /// Fetch the swagger document and return the example body for a dataset.
    pub async fn fetch_request_example(&self, component: &str, dataset: &str) -> Result<Value> {
        let url = self.config.swagger_url.as_str();
        info!("Loading swagger request example for {}/{}", component, dataset);
        let response = self.client.get(url).send().await?;
        let body = read_body(response, url).await?;
        let doc: Value = serde_json::from_str(&body)?;
        extract_request_example(&doc, component, dataset)
    }
}

/// Return the body text of a successful response, or the status as an error.
async fn read_body(response: Response, url: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(HmsError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

#[async_trait]
impl HmsApi for HmsClient {
    async fn submit(&self, component: &str, dataset: &str, body: &Value) -> Result<String> {
        let url = self.config.submit_url(component, dataset);
        let payload = serde_json::to_vec(body)?;
        info!("Submitting request to {}", url);
        debug!("Request body: {}", body);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;
        let text = read_body(response, &url).await?;
        let job_id = parse_job_id(&text)?;
        info!("Submission completed, job id {}", job_id);
        Ok(job_id)
    }

    async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse> {
        let url = self.config.data_url.as_str();
        let response = self
            .client
            .get(url)
            .query(&[(JOB_ID_FIELD, job_id)])
            .send()
            .await?;
        let text = read_body(response, url).await?;
        StatusResponse::from_body(&text)
    }
}
