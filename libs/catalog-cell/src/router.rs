use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_store::AppState;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn catalog_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/reference/distributors", get(handlers::list_distributors))
        .route("/reference/provinces", get(handlers::list_provinces))
        .route("/{practitioner_id}", get(handlers::get_catalog))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
