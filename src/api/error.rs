use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single remote call. Screens collapse every variant into one
/// "operation failed" notification; the variant itself only reaches the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("teacher not found")]
    NotFound,
    #[error("server rejected the request ({status})")]
    Rejected { status: StatusCode },
    #[error("server error ({status})")]
    Server { status: StatusCode },
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// Classify a non-success status code.
    pub(crate) fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound
        } else if status.is_client_error() {
            ApiError::Rejected { status }
        } else {
            ApiError::Server { status }
        }
    }
}
