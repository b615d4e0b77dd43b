use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::CurrentUser;
use shared_store::AppState;

use crate::models::{CatalogError, CatalogQuery};
use crate::services::CatalogResolver;

#[axum::debug_handler]
pub async fn get_catalog(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<CurrentUser>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Value>, AppError> {
    let practitioner = state
        .store
        .get_practitioner(practitioner_id)
        .await
        .ok_or_else(|| CatalogError::PractitionerNotFound(practitioner_id.to_string()))?;

    let resolver = CatalogResolver::new(&state.reference);
    let products = resolver.resolve(&practitioner, query.view)?;

    Ok(Json(json!({
        "view": query.view,
        "total": products.len(),
        "products": products
    })))
}

#[axum::debug_handler]
pub async fn list_distributors(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "distributors": state.reference.distributors
    })))
}

#[axum::debug_handler]
pub async fn list_provinces(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "provinces": state.reference.provinces
    })))
}
