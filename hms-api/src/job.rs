//! Job identifiers, status values and the parsing of HMS job responses.
//!
//! Submit answers with a flat object carrying `job_id`; the data endpoint
//! answers with `status` and, once the job succeeded, `data`.

use crate::error::{HmsError, Result};
use serde_json::{Map, Value};
use std::fmt;

pub const JOB_ID_FIELD: &str = "job_id";
pub const STATUS_FIELD: &str = "status";
pub const DATA_FIELD: &str = "data";

/// Status of an asynchronous HMS job.
///
/// Only `SUCCESS` and `FAILURE` are terminal; `PENDING`, `STARTED` and any
/// other value reported by the service keep the job in `Pending`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum JobStatus {
    Pending,
    Success,
    Failure,
}

impl JobStatus {
    pub fn from_status(status: &str) -> JobStatus {
        match status {
            "SUCCESS" => JobStatus::Success,
            "FAILURE" => JobStatus::Failure,
            _ => JobStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

/// One answer of the data endpoint.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StatusResponse {
    /// Status string exactly as reported, e.g. `STARTED`
    pub raw_status: String,
    pub status: JobStatus,
    /// Result text, only present for `Success`
    pub data: Option<String>,
}

impl StatusResponse {
    /// Parse a data endpoint body.
    ///
    /// On `SUCCESS` the `data` field becomes the result text followed by a
    /// newline: a JSON string is taken verbatim, any other value is written
    /// as compact JSON.
    pub fn from_body(body: &str) -> Result<StatusResponse> {
        let fields = parse_object(body)?;
        let raw_status = match fields.get(STATUS_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => return Err(HmsError::MissingField(STATUS_FIELD)),
        };
        let status = JobStatus::from_status(&raw_status);
        let data = if status == JobStatus::Success {
            let value = fields
                .get(DATA_FIELD)
                .ok_or(HmsError::MissingField(DATA_FIELD))?;
            Some(render_result(value))
        } else {
            None
        };
        Ok(StatusResponse {
            raw_status,
            status,
            data,
        })
    }
}

/// Extract `job_id` from a submit response body.
pub fn parse_job_id(body: &str) -> Result<String> {
    let fields = parse_object(body)?;
    match fields.get(JOB_ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(HmsError::InvalidFormat(format!(
            "`{JOB_ID_FIELD}` is not a usable identifier: {other}"
        ))),
        None => Err(HmsError::MissingField(JOB_ID_FIELD)),
    }
}

fn parse_object(body: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(fields) => Ok(fields),
        other => Err(HmsError::InvalidFormat(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn render_result(value: &Value) -> String {
    let mut text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.push('\n');
    text
}

/// A submitted HMS job and what is known about it so far.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub data: Option<String>,
}

impl Job {
    /// A freshly submitted job; nothing has been polled yet.
    pub fn submitted(id: &str) -> Job {
        Job {
            id: id.to_string(),
            status: JobStatus::Pending,
            data: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fold a poll answer into the job. Terminal jobs never change again.
    pub fn apply(&mut self, response: StatusResponse) {
        if self.is_terminal() {
            return;
        }
        self.status = response.status;
        if response.status == JobStatus::Success {
            self.data = response.data;
        }
    }
}
