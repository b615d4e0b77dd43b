use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::consultation::{ConsultationStatus, ConsultationType, PreliminaryInfo};
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConsultationRequest {
    pub practitioner_id: Uuid,
    pub consultation_type: ConsultationType,
    pub preliminary_info: PreliminaryInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectConsultationRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferConsultationRequest {
    pub practitioner_id: Uuid,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConsultationError {
    #[error("Consultation not found: {0}")]
    NotFound(Uuid),

    #[error("Practitioner not found: {0}")]
    PractitionerNotFound(Uuid),

    #[error("Invalid consultation transition from {from} to {to}")]
    InvalidStatusTransition {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },

    #[error("A rejection reason is required")]
    EmptyRejectReason,

    #[error("A consultation cannot be referred back to its own practitioner")]
    SelfReferral,
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::NotFound(id) => AppError::NotFound(id.to_string()),
            ConsultationError::PractitionerNotFound(id) => AppError::NotFound(id.to_string()),
            ConsultationError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            ConsultationError::EmptyRejectReason | ConsultationError::SelfReferral => {
                AppError::ValidationError(err.to_string())
            }
        }
    }
}
