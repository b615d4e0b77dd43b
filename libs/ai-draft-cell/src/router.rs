use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_store::AppState;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn ai_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/draft", post(handlers::generate_draft))
        .route("/summary", post(handlers::summarize_for_patient))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
