use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::product::FulfillmentSource;

#[derive(Debug, Clone, Deserialize)]
pub struct DraftRequest {
    pub consultation_id: Uuid,
    /// Catalog view whose products the collaborator may suggest from.
    pub view: FulfillmentSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub soap_note: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PractitionerDraft {
    pub soap_note: String,
    /// Names drawn from the available product set. Anything the collaborator
    /// invented outside that set has already been dropped.
    pub suggested_products: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub summary: String,
    /// True when the collaborator failed and `summary` is the raw note.
    pub fallback: bool,
}

#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI collaborator is not configured")]
    NotConfigured,

    #[error("AI collaborator request failed: {0}")]
    Upstream(String),

    #[error("AI collaborator returned an unreadable response")]
    MalformedResponse,
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Upstream(err.to_string())
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::ExternalService(err.to_string())
    }
}
