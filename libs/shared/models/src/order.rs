use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::product::{FulfillmentSource, Product};
use crate::user::{Patient, Practitioner};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PaymentPending,
    Confirmed,
    Preparing,
    ReadyForDelivery,
    ReadyForPickup,
    Delivered,
    Completed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::PaymentPending => write!(f, "payment_pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::ReadyForDelivery => write!(f, "ready_for_delivery"),
            OrderStatus::ReadyForPickup => write!(f, "ready_for_pickup"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Express,
    Pickup,
    FacilityDelivery,
    CentralDelivery,
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMethod::Express => write!(f, "express"),
            DeliveryMethod::Pickup => write!(f, "pickup"),
            DeliveryMethod::FacilityDelivery => write!(f, "facility_delivery"),
            DeliveryMethod::CentralDelivery => write!(f, "central_delivery"),
        }
    }
}

/// Which of the two status tracks an order follows once its delivery method
/// is fixed. Pickup finishes at `completed`, everything shipped finishes at
/// `delivered`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentPath {
    Pickup,
    Delivery,
}

impl DeliveryMethod {
    pub fn fulfillment_path(&self) -> FulfillmentPath {
        match self {
            DeliveryMethod::Pickup => FulfillmentPath::Pickup,
            DeliveryMethod::Express
            | DeliveryMethod::FacilityDelivery
            | DeliveryMethod::CentralDelivery => FulfillmentPath::Delivery,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessengerInfo {
    pub driver_name: String,
    pub driver_phone: String,
    pub booking_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product: Product,
    pub quantity: u32,
    /// Currency amount funded from the practitioner's commission.
    pub practitioner_discount: Option<f64>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }

    pub fn discount_amount(&self) -> f64 {
        self.practitioner_discount.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    /// The consultation this order was produced from. Every order has one;
    /// orders are never fabricated outside a consultation.
    pub consultation_id: Uuid,
    pub patient: Patient,
    pub practitioner: Practitioner,
    pub items: Vec<OrderItem>,
    pub products_cost: f64,
    pub consultation_fee: f64,
    pub total_discount: f64,
    pub total_cost: f64,
    pub status: OrderStatus,
    pub soap_note: Option<String>,
    /// Fixed at creation from the first item's source (or the active catalog
    /// view for an empty order). Never changes afterwards.
    pub fulfillment_source: FulfillmentSource,
    pub delivery_method: Option<DeliveryMethod>,
    pub delivery_address: Option<String>,
    pub shipping_cost: Option<f64>,
    pub messenger_info: Option<MessengerInfo>,
    /// Bumped on every committed mutation; timers and other deferred writers
    /// re-check it before applying.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Rederive every money field from the item lines and the consultation
    /// fee. Totals are never mutated independently of this.
    pub fn recompute_totals(&mut self) {
        self.products_cost = self.items.iter().map(|item| item.line_total()).sum();
        self.total_discount = self.items.iter().map(|item| item.discount_amount()).sum();
        self.total_cost = self.products_cost + self.consultation_fee - self.total_discount;
    }

    pub fn fulfillment_path(&self) -> Option<FulfillmentPath> {
        self.delivery_method.map(|m| m.fulfillment_path())
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}
