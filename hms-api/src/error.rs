/// Error types for the HMS library
use std::time::Duration;
use thiserror::Error;

/// Main error type for HMS operations
#[derive(Error, Debug)]
pub enum HmsError {
    /// HTTP request failed before a response arrived
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The service answered with a non-success status code
    #[error("HMS responded with status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Failed to parse a JSON response body
    #[error("Failed to parse HTTP response: {0}")]
    ResponseParse(#[from] serde_json::Error),

    /// A response body lacks a field the workflow depends on
    #[error("Response is missing field `{0}`")]
    MissingField(&'static str),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// None of latitude/longitude, stationID or hucID was supplied
    #[error("No valid geometry value found (expected latitude+longitude, stationID or hucID)")]
    MissingGeometry,

    /// A geometry input could not be parsed
    #[error("Geometry input `{key}` is not a valid {expected}: {value:?}")]
    InvalidGeometry {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    /// An extra request parameter collides with a core body field
    #[error("Parameter `{0}` is reserved and cannot be overridden")]
    ReservedParameter(String),

    /// Failed to write the result file
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The job did not reach a terminal status in time
    #[error("Timed out after {elapsed:?} waiting for job {job_id}")]
    Timeout { job_id: String, elapsed: Duration },

    /// Polling was cancelled before the job finished
    #[error("Polling cancelled for job {0}")]
    Cancelled(String),
}

impl HmsError {
    /// Whether a retry of the same request might succeed.
    ///
    /// Connection level failures and 5xx answers are transient; everything
    /// else (4xx, malformed bodies, local errors) is not.
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "api")]
            HmsError::HttpRequest(e) => !e.is_decode() && !e.is_builder(),
            HmsError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Type alias for Results using HmsError
pub type Result<T> = std::result::Result<T, HmsError>;

#[cfg(test)]
mod tests {
    use super::HmsError;

    #[test]
    fn test_server_errors_are_transient() {
        let err = HmsError::HttpStatus {
            status: 503,
            url: "http://localhost/data".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_errors_are_fatal() {
        let err = HmsError::HttpStatus {
            status: 404,
            url: "http://localhost/data".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!HmsError::MissingField("status").is_transient());
        assert!(!HmsError::MissingGeometry.is_transient());
    }

    #[test]
    fn test_display_names_missing_field() {
        let err = HmsError::MissingField("job_id");
        assert_eq!(err.to_string(), "Response is missing field `job_id`");
    }
}
