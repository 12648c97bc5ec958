//! Error types for backend requests

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with status {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected response body from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {endpoint} is missing `{field}`")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
}
