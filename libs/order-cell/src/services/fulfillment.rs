use rand::Rng;
use serde::Serialize;
use tracing::debug;

use shared_models::order::{DeliveryMethod, MessengerInfo};

use crate::models::{DeliveryMethodRequest, OrderError};

pub const MIN_SHIPPING_COST: f64 = 20.0;
pub const RATE_PER_UNIT: f64 = 5.0;
pub const MAX_DISTANCE: f64 = 30.0;

/// Where the facility-delivery distance comes from. Production draws a random
/// value; tests inject a fixed one so the floor-and-rate formula is checkable.
pub trait DistanceSource: Send + Sync {
    /// A distance in (0, MAX_DISTANCE] units.
    fn sample(&self) -> f64;
}

pub struct RandomDistance;

impl DistanceSource for RandomDistance {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(0.1..=MAX_DISTANCE)
    }
}

pub struct FixedDistance(pub f64);

impl DistanceSource for FixedDistance {
    fn sample(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShippingQuote {
    pub distance: f64,
    pub cost: f64,
}

/// Fulfillment data captured when a delivery method is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct FulfillmentData {
    pub method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub shipping_cost: Option<f64>,
    pub messenger_info: Option<MessengerInfo>,
}

/// Maps a chosen delivery method to the data each flow must capture.
/// Pickup and central delivery finalize with nothing extra; express needs
/// complete messenger info; facility delivery needs an address plus a
/// computed shipping cost.
pub struct FulfillmentRouter<'a> {
    distance_source: &'a dyn DistanceSource,
}

impl<'a> FulfillmentRouter<'a> {
    pub fn new(distance_source: &'a dyn DistanceSource) -> Self {
        Self { distance_source }
    }

    pub fn quote_shipping(&self) -> ShippingQuote {
        let distance = self.distance_source.sample();
        let cost = (distance * RATE_PER_UNIT).ceil().max(MIN_SHIPPING_COST);
        debug!("Shipping quote: {:.1} units -> {}", distance, cost);
        ShippingQuote { distance, cost }
    }

    pub fn capture(&self, request: DeliveryMethodRequest) -> Result<FulfillmentData, OrderError> {
        match request.method {
            DeliveryMethod::Pickup | DeliveryMethod::CentralDelivery => Ok(FulfillmentData {
                method: request.method,
                delivery_address: None,
                shipping_cost: None,
                messenger_info: None,
            }),
            DeliveryMethod::Express => {
                let info = request
                    .messenger_info
                    .filter(|m| {
                        !m.driver_name.trim().is_empty()
                            && !m.driver_phone.trim().is_empty()
                            && !m.booking_number.trim().is_empty()
                    })
                    .ok_or(OrderError::MissingMessengerInfo)?;
                Ok(FulfillmentData {
                    method: request.method,
                    delivery_address: None,
                    shipping_cost: None,
                    messenger_info: Some(info),
                })
            }
            DeliveryMethod::FacilityDelivery => {
                let address = request
                    .delivery_address
                    .filter(|a| !a.trim().is_empty())
                    .ok_or(OrderError::MissingDeliveryAddress)?;
                let quote = self.quote_shipping();
                Ok(FulfillmentData {
                    method: request.method,
                    delivery_address: Some(address),
                    shipping_cost: Some(quote.cost),
                    messenger_info: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(method: DeliveryMethod) -> DeliveryMethodRequest {
        DeliveryMethodRequest {
            method,
            delivery_address: None,
            messenger_info: None,
        }
    }

    #[test]
    fn short_distances_hit_the_cost_floor() {
        let source = FixedDistance(3.2);
        let quote = FulfillmentRouter::new(&source).quote_shipping();
        assert_eq!(quote.cost, 20.0);
    }

    #[test]
    fn longer_distances_price_by_rate() {
        let source = FixedDistance(10.0);
        let quote = FulfillmentRouter::new(&source).quote_shipping();
        assert_eq!(quote.cost, 50.0);
    }

    #[test]
    fn pickup_and_central_delivery_need_no_capture() {
        let source = FixedDistance(1.0);
        let router = FulfillmentRouter::new(&source);
        for method in [DeliveryMethod::Pickup, DeliveryMethod::CentralDelivery] {
            let data = router.capture(request(method)).unwrap();
            assert_eq!(data.delivery_address, None);
            assert_eq!(data.shipping_cost, None);
            assert_eq!(data.messenger_info, None);
        }
    }

    #[test]
    fn express_requires_complete_messenger_info() {
        let source = FixedDistance(1.0);
        let router = FulfillmentRouter::new(&source);

        let missing = router.capture(request(DeliveryMethod::Express));
        assert_matches!(missing, Err(OrderError::MissingMessengerInfo));

        let blank_phone = router.capture(DeliveryMethodRequest {
            method: DeliveryMethod::Express,
            delivery_address: None,
            messenger_info: Some(MessengerInfo {
                driver_name: "Anucha P.".to_string(),
                driver_phone: "  ".to_string(),
                booking_number: "BK-4471".to_string(),
            }),
        });
        assert_matches!(blank_phone, Err(OrderError::MissingMessengerInfo));
    }

    #[test]
    fn facility_delivery_requires_address_and_computes_shipping() {
        let source = FixedDistance(10.0);
        let router = FulfillmentRouter::new(&source);

        let missing = router.capture(request(DeliveryMethod::FacilityDelivery));
        assert_matches!(missing, Err(OrderError::MissingDeliveryAddress));

        let data = router
            .capture(DeliveryMethodRequest {
                method: DeliveryMethod::FacilityDelivery,
                delivery_address: Some("99/1 Sukhumvit Rd, Bangkok".to_string()),
                messenger_info: None,
            })
            .unwrap();
        assert_eq!(data.shipping_cost, Some(50.0));
    }
}
