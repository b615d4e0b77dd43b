use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    GeneralHealth,
    MedicalDevice,
    DangerousDrug,
    ControlledDrug,
    Cosmetic,
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductCategory::GeneralHealth => write!(f, "general_health"),
            ProductCategory::MedicalDevice => write!(f, "medical_device"),
            ProductCategory::DangerousDrug => write!(f, "dangerous_drug"),
            ProductCategory::ControlledDrug => write!(f, "controlled_drug"),
            ProductCategory::Cosmetic => write!(f, "cosmetic"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentSource {
    Central,
    Local,
}

impl fmt::Display for FulfillmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentSource::Central => write!(f, "central"),
            FulfillmentSource::Local => write!(f, "local"),
        }
    }
}

/// A purchasable catalog entry. The same logical product may exist twice with
/// different source and price (central warehouse vs facility shelf stock);
/// those are distinct entries, never merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: ProductCategory,
    pub source: FulfillmentSource,
    /// Required when source is central.
    pub distributor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Distributor {
    pub id: Uuid,
    pub name: String,
    pub province: String,
}
