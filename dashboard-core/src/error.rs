//! Errors raised at the API boundary.

use thiserror::Error;

/// Coarse classification used by panels and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never completed or the backend answered with a non-2xx status.
    NetworkFailure,
    /// The body did not match the expected schema or violated an invariant.
    MalformedPayload,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Malformed payload from {endpoint}: {reason}")]
    MalformedPayload { endpoint: String, reason: String },
}

impl DashboardError {
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPayload { endpoint: endpoint.into(), reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Status { .. } => ErrorKind::NetworkFailure,
            Self::MalformedPayload { .. } => ErrorKind::MalformedPayload,
        }
    }
}
