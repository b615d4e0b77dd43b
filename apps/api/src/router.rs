use std::sync::Arc;

use axum::{routing::get, Router};

use ai_draft_cell::router::ai_routes;
use catalog_cell::router::catalog_routes;
use consultation_cell::router::consultation_routes;
use order_cell::router::order_routes;
use patient_cell::router::patient_routes;
use practitioner_cell::router::practitioner_routes;
use shared_store::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Medici Marketplace API is running!" }))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/practitioners", practitioner_routes(state.clone()))
        .nest("/catalog", catalog_routes(state.clone()))
        .nest("/consultations", consultation_routes(state.clone()))
        .nest("/orders", order_routes(state.clone()))
        .nest("/ai", ai_routes(state))
}
