use thiserror::Error;

/// Failure of a single request. Recorded per batch, never fatal for a run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid trust root: {source}")]
    TrustRoot {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build request: {source}")]
    BuildRequest {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request timed out: {source}")]
    Timeout {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request cancelled.")]
    Cancelled,
}

impl From<reqwest::Error> for TransportError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TransportError::Timeout { source }
        } else if source.is_builder() {
            TransportError::BuildRequest { source }
        } else {
            TransportError::Request { source }
        }
    }
}
