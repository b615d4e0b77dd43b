use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn practitioner_routes(state: Arc<AppState>) -> Router {
    // Affiliate and shortlink resolution happen before authentication.
    let public_routes = Router::new()
        .route("/affiliate/{slug}", get(handlers::resolve_affiliate))
        .route("/shortlink", post(handlers::resolve_shortlink));

    let protected_routes = Router::new()
        .route("/", get(handlers::list_practitioners))
        .route("/{practitioner_id}", get(handlers::get_practitioner))
        .route("/{practitioner_id}/profile", put(handlers::update_profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
