use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub specialty: Option<String>,
    pub bio: Option<String>,
    pub consultation_fee: Option<f64>,
    pub service_province: Option<String>,
    pub chosen_distributor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlinkRequest {
    pub query: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum DirectoryError {
    #[error("Practitioner not found: {0}")]
    NotFound(String),

    #[error("No practitioner matches affiliate id '{0}'")]
    AffiliateNotFound(String),

    #[error("Unknown province: {0}")]
    UnknownProvince(String),

    #[error("Unknown distributor: {0}")]
    UnknownDistributor(Uuid),

    #[error("Distributor {distributor} serves {distributor_province}, not {province}")]
    DistributorOutsideProvince {
        distributor: Uuid,
        distributor_province: String,
        province: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(msg) => AppError::NotFound(msg),
            DirectoryError::AffiliateNotFound(slug) => {
                AppError::NotFound(format!("No practitioner matches '{}'", slug))
            }
            other => AppError::ValidationError(other.to_string()),
        }
    }
}
