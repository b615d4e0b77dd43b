use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_models::product::FulfillmentSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub view: FulfillmentSource,
}

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Practitioner not found: {0}")]
    PractitionerNotFound(String),

    #[error("Local catalog view is only available to facility-based practitioners")]
    InvalidCatalogView,
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::PractitionerNotFound(msg) => AppError::NotFound(msg),
            CatalogError::InvalidCatalogView => {
                AppError::BadRequest(CatalogError::InvalidCatalogView.to_string())
            }
        }
    }
}
