use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use consultation_cell::models::ConsultationError;
use consultation_cell::services::ConsultationLifecycleService;
use shared_models::consultation::ConsultationStatus;
use shared_models::order::{FulfillmentPath, Order, OrderItem, OrderStatus};
use shared_models::product::{FulfillmentSource, Product};
use shared_store::{AppState, UpdateRejected};

use crate::models::{
    CreateOrderRequest, DeliveryMethodRequest, OrderError, OrderItemRequest, OrderListQuery,
};
use crate::services::fulfillment::{DistanceSource, FulfillmentRouter, ShippingQuote};
use crate::services::pricing;

/// Owns the order state machine. Every order starts at `payment_pending`;
/// once a delivery method is chosen the pickup or delivery track applies and
/// the status only ever moves forward along it.
pub struct OrderLifecycleService<'a> {
    state: &'a AppState,
}

impl<'a> OrderLifecycleService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// The single forward step available from the order's current status.
    pub(crate) fn next_status(order: &Order) -> Result<OrderStatus, OrderError> {
        match order.status {
            OrderStatus::PaymentPending => Ok(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Ok(OrderStatus::Preparing),
            OrderStatus::Preparing => match order.fulfillment_path() {
                Some(FulfillmentPath::Pickup) => Ok(OrderStatus::ReadyForPickup),
                Some(FulfillmentPath::Delivery) => Ok(OrderStatus::ReadyForDelivery),
                None => Err(OrderError::MissingDeliveryMethod),
            },
            OrderStatus::ReadyForPickup => Ok(OrderStatus::Completed),
            OrderStatus::ReadyForDelivery => Ok(OrderStatus::Delivered),
            terminal => Err(OrderError::InvalidTransition {
                from: terminal,
                to: terminal,
            }),
        }
    }

    /// Completing an active consultation produces the order and finishes the
    /// consultation. An order is never fabricated without a consultation.
    pub async fn create(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        let consultation = self
            .state
            .store
            .get_consultation(request.consultation_id)
            .await
            .ok_or(OrderError::Consultation(ConsultationError::NotFound(
                request.consultation_id,
            )))?;

        if consultation.status != ConsultationStatus::Active {
            return Err(OrderError::ConsultationNotActive(consultation.status));
        }

        let mut items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity);
            }
            let product = self.resolve_product(consultation.practitioner.id, line)?;
            items.push(OrderItem {
                product,
                quantity: line.quantity,
                practitioner_discount: None,
            });
        }

        let fulfillment_source = items
            .first()
            .map(|item| item.product.source)
            .or(request.catalog_view)
            .unwrap_or(FulfillmentSource::Central);

        // Close the consultation first; if that fails no order exists.
        ConsultationLifecycleService::new(self.state)
            .finish(consultation.id)
            .await?;

        let mut order = Order {
            id: format!("ORD-{}", Uuid::new_v4().simple()),
            consultation_id: consultation.id,
            patient: consultation.patient.clone(),
            practitioner: consultation.practitioner.clone(),
            items,
            products_cost: 0.0,
            consultation_fee: consultation.practitioner.effective_consultation_fee(),
            total_discount: 0.0,
            total_cost: 0.0,
            status: OrderStatus::PaymentPending,
            soap_note: request.soap_note,
            fulfillment_source,
            delivery_method: None,
            delivery_address: None,
            shipping_cost: None,
            messenger_info: None,
            version: 0,
            created_at: Utc::now(),
        };
        order.recompute_totals();

        info!(
            "Order {} created from consultation {}, total {}",
            order.id, order.consultation_id, order.total_cost
        );
        self.state.store.insert_order(order.clone()).await;
        Ok(order)
    }

    pub async fn get(&self, id: &str) -> Result<Order, OrderError> {
        self.state
            .store
            .get_order(id)
            .await
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Orders filtered by participant and, optionally, non-terminal status.
    /// The non-terminal filter is what callers use to enforce a single
    /// active order per patient.
    pub async fn list(&self, query: &OrderListQuery) -> Vec<Order> {
        let active_only = query.active.unwrap_or(false);
        self.state
            .store
            .list_orders(|order| {
                query.patient_id.map_or(true, |id| order.patient.id == id)
                    && query
                        .practitioner_id
                        .map_or(true, |id| order.practitioner.id == id)
                    && (!active_only || order.is_active())
            })
            .await
    }

    pub async fn add_item(
        &self,
        order_id: &str,
        request: OrderItemRequest,
    ) -> Result<Order, OrderError> {
        if request.quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }
        let order = self.get(order_id).await?;
        let product = self.resolve_product(order.practitioner.id, &request)?;

        self.apply(order_id, move |draft| {
            Self::require_items_unlocked(draft)?;
            match draft
                .items
                .iter_mut()
                .find(|item| item.product.id == product.id)
            {
                // The stored discount amount stays; the grown commission
                // still covers it. Practitioners re-apply a percent to
                // rescale it.
                Some(existing) => existing.quantity += request.quantity,
                None => draft.items.push(OrderItem {
                    product,
                    quantity: request.quantity,
                    practitioner_discount: None,
                }),
            }
            draft.recompute_totals();
            Ok(())
        })
        .await
    }

    pub async fn remove_item(&self, order_id: &str, product_id: Uuid) -> Result<Order, OrderError> {
        self.apply(order_id, |draft| {
            Self::require_items_unlocked(draft)?;
            let before = draft.items.len();
            draft.items.retain(|item| item.product.id != product_id);
            if draft.items.len() == before {
                return Err(OrderError::ItemNotFound(product_id));
            }
            draft.recompute_totals();
            Ok(())
        })
        .await
    }

    /// Grants a percent-of-commission discount on one line. Re-application
    /// replaces the prior amount, it never accumulates.
    pub async fn apply_discount(
        &self,
        order_id: &str,
        product_id: Uuid,
        percent: u8,
    ) -> Result<Order, OrderError> {
        self.apply(order_id, |draft| {
            Self::require_items_unlocked(draft)?;
            let item = draft
                .items
                .iter_mut()
                .find(|item| item.product.id == product_id)
                .ok_or(OrderError::ItemNotFound(product_id))?;
            let amount = pricing::discount_for(item, percent)?;
            item.practitioner_discount = Some(amount);
            draft.recompute_totals();
            Ok(())
        })
        .await
    }

    /// Patient confirmed payment (the proof step itself lives outside this
    /// service; only the transition is recorded).
    pub async fn confirm_payment(&self, order_id: &str) -> Result<Order, OrderError> {
        self.transition_to(order_id, OrderStatus::Confirmed).await
    }

    pub async fn quote_shipping(
        &self,
        order_id: &str,
        distance_source: &dyn DistanceSource,
    ) -> Result<ShippingQuote, OrderError> {
        self.get(order_id).await?;
        Ok(FulfillmentRouter::new(distance_source).quote_shipping())
    }

    /// Chooses the delivery method while the order is `confirmed` or already
    /// `preparing` (the patient may still be deciding while the practitioner
    /// packs). The method permanently fixes which status track the order
    /// follows and captures whatever fulfillment data the method needs.
    pub async fn choose_delivery_method(
        &self,
        order_id: &str,
        request: DeliveryMethodRequest,
        distance_source: &dyn DistanceSource,
    ) -> Result<Order, OrderError> {
        let data = FulfillmentRouter::new(distance_source).capture(request)?;

        let updated = self
            .apply(order_id, move |draft| {
                if !matches!(
                    draft.status,
                    OrderStatus::Confirmed | OrderStatus::Preparing
                ) {
                    return Err(OrderError::MethodNotSelectable(draft.status));
                }
                if let Some(existing) = draft.delivery_method {
                    return Err(OrderError::MethodAlreadySet(existing));
                }
                draft.delivery_method = Some(data.method);
                draft.delivery_address = data.delivery_address;
                draft.shipping_cost = data.shipping_cost;
                draft.messenger_info = data.messenger_info;
                Ok(())
            })
            .await?;

        if let Some(method) = updated.delivery_method {
            info!("Order {} will fulfil via {}", updated.id, method);
        }
        Ok(updated)
    }

    /// Moves the order one step forward along its track.
    pub async fn advance(&self, order_id: &str) -> Result<Order, OrderError> {
        let order = self.get(order_id).await?;
        let next = Self::next_status(&order)?;
        self.transition_to(order_id, next).await
    }

    /// Applies one explicit transition. Anything not on the order's track
    /// from its current status is rejected and the record stays untouched.
    pub async fn transition_to(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let updated = self
            .apply(order_id, |draft| {
                match Self::next_status(draft) {
                    Ok(expected) if expected == new_status => {}
                    Ok(_) => {
                        warn!(
                            "Invalid order transition attempted: {} -> {}",
                            draft.status, new_status
                        );
                        return Err(OrderError::InvalidTransition {
                            from: draft.status,
                            to: new_status,
                        });
                    }
                    Err(OrderError::MissingDeliveryMethod) => {
                        return Err(OrderError::MissingDeliveryMethod)
                    }
                    Err(_) => {
                        return Err(OrderError::InvalidTransition {
                            from: draft.status,
                            to: new_status,
                        })
                    }
                }
                draft.status = new_status;
                Ok(())
            })
            .await?;

        info!("Order {} is now {}", updated.id, updated.status);
        Ok(updated)
    }

    fn resolve_product(
        &self,
        practitioner_id: Uuid,
        line: &OrderItemRequest,
    ) -> Result<Product, OrderError> {
        let found = match line.source {
            FulfillmentSource::Central => self.state.reference.central_product(line.product_id),
            FulfillmentSource::Local => self
                .state
                .reference
                .local_product(practitioner_id, line.product_id),
        };
        found
            .cloned()
            .ok_or(OrderError::ProductNotFound(line.product_id))
    }

    fn require_items_unlocked(order: &Order) -> Result<(), OrderError> {
        if order.status != OrderStatus::PaymentPending {
            debug!(
                "Item mutation refused for order {} at {}",
                order.id, order.status
            );
            return Err(OrderError::ItemMutationLocked(order.status));
        }
        Ok(())
    }

    async fn apply<F>(&self, order_id: &str, mutate: F) -> Result<Order, OrderError>
    where
        F: FnOnce(&mut Order) -> Result<(), OrderError>,
    {
        self.state
            .store
            .update_order(order_id, mutate)
            .await
            .map_err(|e| match e {
                UpdateRejected::NotFound => OrderError::NotFound(order_id.to_string()),
                UpdateRejected::Rejected(inner) => inner,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::consultation::{ConsultationType, PreliminaryInfo};
    use shared_models::order::{DeliveryMethod, MessengerInfo};

    use crate::models::CreateOrderRequest;
    use crate::services::fulfillment::FixedDistance;

    async fn active_consultation(state: &AppState) -> Uuid {
        let patient = state.store.list_patients().await[0].clone();
        let practitioner = state
            .store
            .list_practitioners()
            .await
            .into_iter()
            .find(|p| p.consultation_fee == Some(500.0))
            .unwrap();
        let service = ConsultationLifecycleService::new(state);
        let consultation = service
            .create(
                &patient,
                consultation_cell::models::CreateConsultationRequest {
                    practitioner_id: practitioner.id,
                    consultation_type: ConsultationType::Video,
                    preliminary_info: PreliminaryInfo {
                        symptoms: "Recurring acne".to_string(),
                        diseases: "None".to_string(),
                        allergies: "None".to_string(),
                        weight: None,
                        height: None,
                    },
                },
            )
            .await
            .unwrap();
        service.accept(consultation.id).await.unwrap();
        consultation.id
    }

    fn vitamin_c(state: &AppState) -> Product {
        state
            .reference
            .central_products
            .iter()
            .find(|p| p.name == "Vitamin C 1000mg")
            .unwrap()
            .clone()
    }

    async fn order_fixture(state: &AppState) -> Order {
        let consultation_id = active_consultation(state).await;
        let product = vitamin_c(state);
        OrderLifecycleService::new(state)
            .create(CreateOrderRequest {
                consultation_id,
                items: vec![OrderItemRequest {
                    product_id: product.id,
                    source: FulfillmentSource::Central,
                    quantity: 2,
                }],
                soap_note: Some("S: acne. O: -. A: mild. P: topical care.".to_string()),
                catalog_view: Some(FulfillmentSource::Central),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creation_finishes_the_consultation_and_prices_the_order() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;

        assert_eq!(order.status, OrderStatus::PaymentPending);
        assert_eq!(order.products_cost, 240.0);
        assert_eq!(order.consultation_fee, 500.0);
        assert_eq!(order.total_cost, 740.0);
        assert_eq!(order.fulfillment_source, FulfillmentSource::Central);

        let consultation = state
            .store
            .get_consultation(order.consultation_id)
            .await
            .unwrap();
        assert_eq!(consultation.status, ConsultationStatus::Finished);
    }

    #[tokio::test]
    async fn half_commission_discount_lands_on_the_expected_total() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let product_id = order.items[0].product.id;
        let service = OrderLifecycleService::new(&state);

        let discounted = service.apply_discount(&order.id, product_id, 50).await.unwrap();

        // 120 x 2 = 240 products, commission 48, half of it back to the patient.
        assert_eq!(discounted.items[0].practitioner_discount, Some(24.0));
        assert_eq!(discounted.total_discount, 24.0);
        assert_eq!(discounted.total_cost, 716.0);

        // Re-application replaces the amount instead of stacking it.
        let replaced = service.apply_discount(&order.id, product_id, 25).await.unwrap();
        assert_eq!(replaced.total_discount, 12.0);
        assert_eq!(replaced.total_cost, 728.0);
    }

    #[tokio::test]
    async fn totals_stay_consistent_through_item_mutations() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let zinc = state
            .reference
            .central_products
            .iter()
            .find(|p| p.name == "Zinc 15mg")
            .unwrap()
            .clone();

        service
            .add_item(
                &order.id,
                OrderItemRequest {
                    product_id: zinc.id,
                    source: FulfillmentSource::Central,
                    quantity: 3,
                },
            )
            .await
            .unwrap();
        service
            .apply_discount(&order.id, zinc.id, 100)
            .await
            .unwrap();
        let current = service
            .remove_item(&order.id, order.items[0].product.id)
            .await
            .unwrap();

        let expected_products: f64 = current.items.iter().map(|i| i.line_total()).sum();
        let expected_discount: f64 = current.items.iter().map(|i| i.discount_amount()).sum();
        assert_eq!(current.products_cost, expected_products);
        assert_eq!(current.total_discount, expected_discount);
        assert_eq!(
            current.total_cost,
            expected_products + current.consultation_fee - expected_discount
        );
    }

    #[tokio::test]
    async fn creation_requires_an_active_consultation() {
        let state = AppState::for_tests().await;
        let patient = state.store.list_patients().await[0].clone();
        let practitioner = state.store.list_practitioners().await[0].clone();
        let pending = ConsultationLifecycleService::new(&state)
            .create(
                &patient,
                consultation_cell::models::CreateConsultationRequest {
                    practitioner_id: practitioner.id,
                    consultation_type: ConsultationType::Chat,
                    preliminary_info: PreliminaryInfo {
                        symptoms: "Cough".to_string(),
                        diseases: "None".to_string(),
                        allergies: "None".to_string(),
                        weight: None,
                        height: None,
                    },
                },
            )
            .await
            .unwrap();

        let result = OrderLifecycleService::new(&state)
            .create(CreateOrderRequest {
                consultation_id: pending.id,
                items: vec![],
                soap_note: None,
                catalog_view: None,
            })
            .await;

        assert_matches!(
            result,
            Err(OrderError::ConsultationNotActive(
                ConsultationStatus::Pending
            ))
        );
    }

    #[tokio::test]
    async fn item_mutations_lock_once_payment_is_confirmed() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let confirmed = service.confirm_payment(&order.id).await.unwrap();

        let result = service
            .add_item(
                &order.id,
                OrderItemRequest {
                    product_id: order.items[0].product.id,
                    source: FulfillmentSource::Central,
                    quantity: 1,
                },
            )
            .await;

        assert_matches!(
            result,
            Err(OrderError::ItemMutationLocked(OrderStatus::Confirmed))
        );
        assert_eq!(service.get(&order.id).await.unwrap(), confirmed);
    }

    #[tokio::test]
    async fn pickup_track_runs_forward_only() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let source = FixedDistance(1.0);

        service.confirm_payment(&order.id).await.unwrap();
        service
            .choose_delivery_method(
                &order.id,
                DeliveryMethodRequest {
                    method: DeliveryMethod::Pickup,
                    delivery_address: None,
                    messenger_info: None,
                },
                &source,
            )
            .await
            .unwrap();
        service.advance(&order.id).await.unwrap(); // preparing
        let ready = service.advance(&order.id).await.unwrap();
        assert_eq!(ready.status, OrderStatus::ReadyForPickup);

        // Regressing is rejected and the stored record is untouched.
        let regress = service.transition_to(&order.id, OrderStatus::Preparing).await;
        assert_matches!(
            regress,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::ReadyForPickup,
                to: OrderStatus::Preparing,
            })
        );
        assert_eq!(service.get(&order.id).await.unwrap(), ready);

        let done = service.advance(&order.id).await.unwrap();
        assert_eq!(done.status, OrderStatus::Completed);
        assert_matches!(
            service.advance(&order.id).await,
            Err(OrderError::InvalidTransition { .. })
        );
    }

    #[tokio::test]
    async fn express_fixes_the_delivery_track() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let source = FixedDistance(1.0);

        service.confirm_payment(&order.id).await.unwrap();
        service
            .choose_delivery_method(
                &order.id,
                DeliveryMethodRequest {
                    method: DeliveryMethod::Express,
                    delivery_address: None,
                    messenger_info: Some(MessengerInfo {
                        driver_name: "Anucha P.".to_string(),
                        driver_phone: "0861112222".to_string(),
                        booking_number: "BK-4471".to_string(),
                    }),
                },
                &source,
            )
            .await
            .unwrap();

        service.advance(&order.id).await.unwrap(); // preparing
        let ready = service.advance(&order.id).await.unwrap();
        assert_eq!(ready.status, OrderStatus::ReadyForDelivery);
        let delivered = service.advance(&order.id).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn method_selection_is_gated_and_permanent() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let source = FixedDistance(1.0);
        let pickup = DeliveryMethodRequest {
            method: DeliveryMethod::Pickup,
            delivery_address: None,
            messenger_info: None,
        };

        let early = service
            .choose_delivery_method(&order.id, pickup.clone(), &source)
            .await;
        assert_matches!(
            early,
            Err(OrderError::MethodNotSelectable(OrderStatus::PaymentPending))
        );

        service.confirm_payment(&order.id).await.unwrap();
        service
            .choose_delivery_method(&order.id, pickup.clone(), &source)
            .await
            .unwrap();
        let again = service.choose_delivery_method(&order.id, pickup, &source).await;
        assert_matches!(
            again,
            Err(OrderError::MethodAlreadySet(DeliveryMethod::Pickup))
        );
    }

    #[tokio::test]
    async fn method_chosen_during_preparing_resumes_the_track() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let source = FixedDistance(1.0);

        // Practitioner starts preparing before the patient has picked.
        service.confirm_payment(&order.id).await.unwrap();
        service.advance(&order.id).await.unwrap();
        assert_matches!(
            service.advance(&order.id).await,
            Err(OrderError::MissingDeliveryMethod)
        );

        let updated = service
            .choose_delivery_method(
                &order.id,
                DeliveryMethodRequest {
                    method: DeliveryMethod::Pickup,
                    delivery_address: None,
                    messenger_info: None,
                },
                &source,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);
        assert_eq!(updated.delivery_method, Some(DeliveryMethod::Pickup));

        let ready = service.advance(&order.id).await.unwrap();
        assert_eq!(ready.status, OrderStatus::ReadyForPickup);

        let late = service
            .choose_delivery_method(
                &order.id,
                DeliveryMethodRequest {
                    method: DeliveryMethod::Pickup,
                    delivery_address: None,
                    messenger_info: None,
                },
                &source,
            )
            .await;
        assert_matches!(
            late,
            Err(OrderError::MethodAlreadySet(DeliveryMethod::Pickup))
        );
    }

    #[tokio::test]
    async fn preparing_cannot_advance_without_a_method() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);

        service.confirm_payment(&order.id).await.unwrap();
        service.advance(&order.id).await.unwrap(); // preparing, method still unset

        let result = service.advance(&order.id).await;
        assert_matches!(result, Err(OrderError::MissingDeliveryMethod));
        assert_eq!(
            service.get(&order.id).await.unwrap().status,
            OrderStatus::Preparing
        );
    }

    #[tokio::test]
    async fn facility_delivery_captures_address_and_shipping() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let source = FixedDistance(10.0);

        service.confirm_payment(&order.id).await.unwrap();
        let updated = service
            .choose_delivery_method(
                &order.id,
                DeliveryMethodRequest {
                    method: DeliveryMethod::FacilityDelivery,
                    delivery_address: Some("99/1 Nimman Rd, Chiang Mai".to_string()),
                    messenger_info: None,
                },
                &source,
            )
            .await
            .unwrap();

        assert_eq!(updated.shipping_cost, Some(50.0));
        assert_eq!(
            updated.delivery_address.as_deref(),
            Some("99/1 Nimman Rd, Chiang Mai")
        );
    }

    #[tokio::test]
    async fn active_filter_exposes_only_open_orders() {
        let state = AppState::for_tests().await;
        let order = order_fixture(&state).await;
        let service = OrderLifecycleService::new(&state);
        let source = FixedDistance(1.0);
        let patient_id = order.patient.id;

        let query = OrderListQuery {
            patient_id: Some(patient_id),
            practitioner_id: None,
            active: Some(true),
        };
        assert_eq!(service.list(&query).await.len(), 1);

        service.confirm_payment(&order.id).await.unwrap();
        service
            .choose_delivery_method(
                &order.id,
                DeliveryMethodRequest {
                    method: DeliveryMethod::Pickup,
                    delivery_address: None,
                    messenger_info: None,
                },
                &source,
            )
            .await
            .unwrap();
        service.advance(&order.id).await.unwrap();
        service.advance(&order.id).await.unwrap();
        service.advance(&order.id).await.unwrap();

        assert!(service.list(&query).await.is_empty());
    }
}
