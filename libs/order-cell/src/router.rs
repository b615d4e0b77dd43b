use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn order_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::create_order))
        .route("/", get(handlers::list_orders))
        .route("/{order_id}", get(handlers::get_order))
        .route("/{order_id}/items", post(handlers::add_item))
        .route(
            "/{order_id}/items/{product_id}",
            delete(handlers::remove_item),
        )
        .route(
            "/{order_id}/items/{product_id}/discount",
            post(handlers::apply_discount),
        )
        .route("/{order_id}/confirm-payment", post(handlers::confirm_payment))
        .route("/{order_id}/shipping-quote", get(handlers::shipping_quote))
        .route(
            "/{order_id}/delivery-method",
            post(handlers::choose_delivery_method),
        )
        .route("/{order_id}/advance", post(handlers::advance_order))
        .route(
            "/{order_id}/auto-advance",
            post(handlers::auto_advance_order),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
