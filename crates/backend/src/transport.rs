use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tadilat_core::blog::non_empty;
use tadilat_core::lead::{LeadSubmission, LeadTransport, TransportError};
use tracing::info;

use crate::error::BackendError;
use crate::{Backend, CONTACT_TABLE};

impl From<BackendError> for TransportError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Network(message) => TransportError::Network(message),
            BackendError::Rejected { code, message, .. } => {
                TransportError::Rejected { code, message }
            }
            other => TransportError::Unexpected(other.to_string()),
        }
    }
}

/// Row written for one lead; blank optional text is stored as null
pub fn lead_row(lead: &LeadSubmission) -> Value {
    json!({
        "name": lead.name,
        "phone": lead.phone,
        "district": non_empty(&lead.district),
        "renovation_type": lead.renovation_type.key(),
        "details": non_empty(&lead.details),
    })
}

/// Stores leads in the `contact_submissions` table
pub struct ContactSubmissions<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: Backend + ?Sized> ContactSubmissions<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: Backend + ?Sized> LeadTransport for ContactSubmissions<B> {
    async fn submit(&self, lead: &LeadSubmission) -> Result<(), TransportError> {
        self.backend.insert(CONTACT_TABLE, lead_row(lead)).await?;
        info!(district = %lead.district, kind = %lead.renovation_type, "lead stored");
        Ok(())
    }
}
