use async_trait::async_trait;
use thiserror::Error;

use super::gate::LeadSubmission;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never got a response
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with an error (constraint, permission, ...)
    #[error("backend rejected submission: {message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Sends a validated lead to wherever leads are stored.
///
/// Implementations make exactly one write attempt per call and never retry.
#[async_trait]
pub trait LeadTransport: Send + Sync {
    async fn submit(&self, lead: &LeadSubmission) -> Result<(), TransportError>;
}
