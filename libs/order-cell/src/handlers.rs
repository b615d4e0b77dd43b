use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::order::Order;
use shared_models::user::CurrentUser;
use shared_store::AppState;

use crate::models::{
    ApplyDiscountRequest, AutoAdvanceRequest, CreateOrderRequest, DeliveryMethodRequest,
    OrderItemRequest, OrderListQuery,
};
use crate::services::{AutoAdvanceScheduler, OrderLifecycleService, RandomDistance};

#[axum::debug_handler]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<Value>, AppError> {
    let consultation = state
        .store
        .get_consultation(request.consultation_id)
        .await
        .ok_or_else(|| AppError::NotFound(request.consultation_id.to_string()))?;
    if user.id() != consultation.practitioner.id {
        return Err(AppError::Auth(
            "Only the consulting practitioner can produce an order".to_string(),
        ));
    }

    let service = OrderLifecycleService::new(&state);

    let order = service.create(request).await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    let order = service.get(&order_id).await?;
    require_participant(&user, &order)?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(mut query): Query<OrderListQuery>,
) -> Result<Json<Value>, AppError> {
    // Listings are always scoped to the caller's own side of the order.
    match &user {
        CurrentUser::Patient(patient) => query.patient_id = Some(patient.id),
        CurrentUser::Practitioner(practitioner) => {
            query.practitioner_id = Some(practitioner.id)
        }
    }

    let service = OrderLifecycleService::new(&state);

    let orders = service.list(&query).await;

    Ok(Json(json!(orders)))
}

#[axum::debug_handler]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
    Json(request): Json<OrderItemRequest>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    require_practitioner_of(&service, &user, &order_id).await?;
    let order = service.add_item(&order_id, request).await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((order_id, product_id)): Path<(String, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    require_practitioner_of(&service, &user, &order_id).await?;
    let order = service.remove_item(&order_id, product_id).await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn apply_discount(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((order_id, product_id)): Path<(String, Uuid)>,
    Json(request): Json<ApplyDiscountRequest>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    require_practitioner_of(&service, &user, &order_id).await?;
    let order = service
        .apply_discount(&order_id, product_id, request.percent)
        .await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    let order = service.get(&order_id).await?;
    if user.id() != order.patient.id {
        return Err(AppError::Auth(
            "Only the ordering patient can confirm payment".to_string(),
        ));
    }
    let order = service.confirm_payment(&order_id).await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn shipping_quote(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    let order = service.get(&order_id).await?;
    require_participant(&user, &order)?;
    let quote = service.quote_shipping(&order_id, &RandomDistance).await?;

    Ok(Json(json!(quote)))
}

#[axum::debug_handler]
pub async fn choose_delivery_method(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
    Json(request): Json<DeliveryMethodRequest>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    let order = service.get(&order_id).await?;
    if user.id() != order.patient.id {
        return Err(AppError::Auth(
            "Only the ordering patient can choose a delivery method".to_string(),
        ));
    }
    let order = service
        .choose_delivery_method(&order_id, request, &RandomDistance)
        .await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn advance_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = OrderLifecycleService::new(&state);

    require_practitioner_of(&service, &user, &order_id).await?;
    let order = service.advance(&order_id).await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn auto_advance_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
    Json(request): Json<AutoAdvanceRequest>,
) -> Result<Json<Value>, AppError> {
    {
        let service = OrderLifecycleService::new(&state);
        require_practitioner_of(&service, &user, &order_id).await?;
    }

    // The handle is detached; a fresh request (or the order moving on) makes
    // the timer stale rather than cancelled.
    let _detached = AutoAdvanceScheduler::schedule(
        state.clone(),
        order_id.clone(),
        Duration::from_millis(request.delay_ms),
    )
    .await?;

    Ok(Json(json!({
        "order_id": order_id,
        "scheduled_in_ms": request.delay_ms,
    })))
}

fn require_participant(user: &CurrentUser, order: &Order) -> Result<(), AppError> {
    if user.id() != order.patient.id && user.id() != order.practitioner.id {
        return Err(AppError::Auth(
            "Only the participants can view an order".to_string(),
        ));
    }
    Ok(())
}

async fn require_practitioner_of(
    service: &OrderLifecycleService<'_>,
    user: &CurrentUser,
    order_id: &str,
) -> Result<(), AppError> {
    let order = service.get(order_id).await?;
    if user.id() != order.practitioner.id {
        return Err(AppError::Auth(
            "Only the order's practitioner can do this".to_string(),
        ));
    }
    Ok(())
}
