use shared_models::order::OrderItem;
use shared_models::product::FulfillmentSource;

use crate::models::OrderError;

/// Share of a central-sourced line total credited to the practitioner.
pub const COMMISSION_RATE: f64 = 0.20;

/// The only discount percentages a practitioner may grant.
pub const DISCOUNT_PERCENTS: [u8; 4] = [0, 25, 50, 100];

/// Commission earned on one line item. Local inventory and independently
/// sourced drugs carry no commission.
pub fn commission_for(item: &OrderItem) -> f64 {
    if item.product.source != FulfillmentSource::Central {
        return 0.0;
    }
    item.line_total() * COMMISSION_RATE
}

/// Currency amount a requested discount percent translates to for an item.
/// The discount is funded from the practitioner's commission, so it can only
/// target central-sourced items and can never exceed the commission itself.
pub fn discount_for(item: &OrderItem, percent: u8) -> Result<f64, OrderError> {
    if item.product.source != FulfillmentSource::Central {
        return Err(OrderError::InvalidDiscountTarget);
    }
    if !DISCOUNT_PERCENTS.contains(&percent) {
        return Err(OrderError::InvalidDiscountPercent(percent));
    }
    Ok(commission_for(item) * f64::from(percent) / 100.0)
}
