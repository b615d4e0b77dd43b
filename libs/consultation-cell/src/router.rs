use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn consultation_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::create_consultation))
        .route("/{consultation_id}", get(handlers::get_consultation))
        .route("/queue/{practitioner_id}", get(handlers::get_pending_queue))
        .route(
            "/{consultation_id}/accept",
            post(handlers::accept_consultation),
        )
        .route(
            "/{consultation_id}/reject",
            post(handlers::reject_consultation),
        )
        .route(
            "/{consultation_id}/refer",
            post(handlers::refer_consultation),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
