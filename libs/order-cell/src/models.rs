use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use consultation_cell::models::ConsultationError;
use shared_models::consultation::ConsultationStatus;
use shared_models::error::AppError;
use shared_models::order::{DeliveryMethod, MessengerInfo, OrderStatus};
use shared_models::product::FulfillmentSource;

/// A line item as requested over the wire. The product is resolved against
/// the central catalog or the practitioner's local inventory by `source`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub source: FulfillmentSource,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub consultation_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub soap_note: Option<String>,
    /// Catalog view the practitioner was working in. Decides the order's
    /// fulfillment source when no items were added during the session.
    pub catalog_view: Option<FulfillmentSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyDiscountRequest {
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryMethodRequest {
    pub method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub messenger_info: Option<MessengerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoAdvanceRequest {
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderListQuery {
    pub patient_id: Option<Uuid>,
    pub practitioner_id: Option<Uuid>,
    /// When true, only non-terminal orders are returned.
    pub active: Option<bool>,
}

#[derive(Error, Debug, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Consultation(#[from] ConsultationError),

    #[error("Orders can only be produced from an active consultation, found {0}")]
    ConsultationNotActive(ConsultationStatus),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Quantity must be positive")]
    InvalidQuantity,

    #[error("Invalid order transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Items can only change while payment is pending, order is {0}")]
    ItemMutationLocked(OrderStatus),

    #[error("Order has no item for product {0}")]
    ItemNotFound(Uuid),

    #[error("Discounts only apply to central-sourced items")]
    InvalidDiscountTarget,

    #[error("Discount percent must be one of 0, 25, 50 or 100, got {0}")]
    InvalidDiscountPercent(u8),

    #[error("Delivery method cannot be chosen at status {0}")]
    MethodNotSelectable(OrderStatus),

    #[error("Delivery method is already set to {0}")]
    MethodAlreadySet(DeliveryMethod),

    #[error("A delivery method must be chosen before fulfillment can proceed")]
    MissingDeliveryMethod,

    #[error("Express delivery requires complete messenger info")]
    MissingMessengerInfo,

    #[error("Facility delivery requires a delivery address")]
    MissingDeliveryAddress,
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => AppError::NotFound(id),
            OrderError::Consultation(inner) => inner.into(),
            OrderError::ProductNotFound(id) => AppError::NotFound(id.to_string()),
            OrderError::ItemNotFound(id) => AppError::NotFound(id.to_string()),
            OrderError::InvalidTransition { .. }
            | OrderError::ConsultationNotActive(_)
            | OrderError::ItemMutationLocked(_)
            | OrderError::MethodNotSelectable(_)
            | OrderError::MethodAlreadySet(_)
            | OrderError::MissingDeliveryMethod => AppError::Conflict(err.to_string()),
            OrderError::InvalidQuantity
            | OrderError::InvalidDiscountTarget
            | OrderError::InvalidDiscountPercent(_)
            | OrderError::MissingMessengerInfo
            | OrderError::MissingDeliveryAddress => AppError::ValidationError(err.to_string()),
        }
    }
}
