use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/{patient_id}", get(handlers::get_patient))
        .route("/{patient_id}", put(handlers::update_patient))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
