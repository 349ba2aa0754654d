//! Error types shared by the fetch pipelines.

use thiserror::Error;

/// Failure while fetching one upstream endpoint.
///
/// Both variants carry the endpoint identifier so that a failed aggregation
/// can be traced back to the category that broke it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or body-read failure.
    #[error("Problem with {endpoint} request: {message}")]
    Transport { endpoint: String, message: String },

    /// The body was not valid JSON.
    #[error("Invalid JSON response for {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Endpoint identifier the error originated from.
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. } | FetchError::Parse { endpoint, .. } => endpoint,
        }
    }

    /// Whether this is an "upstream unreachable" failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }
}
