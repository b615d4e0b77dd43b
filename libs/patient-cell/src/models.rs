use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub drug_allergies: Option<String>,
    pub chronic_diseases: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum PatientError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(msg) => AppError::NotFound(msg),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}
