use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::CurrentUser;
use shared_store::AppState;

use crate::models::{ShortlinkRequest, UpdateProfileRequest};
use crate::services::DirectoryService;

#[axum::debug_handler]
pub async fn list_practitioners(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let practitioners = service.list_practitioners().await;

    Ok(Json(json!({
        "practitioners": practitioners,
        "total": practitioners.len()
    })))
}

#[axum::debug_handler]
pub async fn get_practitioner(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<CurrentUser>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let practitioner = service.get_practitioner(practitioner_id).await?;

    Ok(Json(json!(practitioner)))
}

/// Pre-auth: affiliate links resolve before any login happens.
#[axum::debug_handler]
pub async fn resolve_affiliate(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let practitioner = service.resolve_affiliate(&slug).await?;

    Ok(Json(json!(practitioner)))
}

/// Pre-auth: shortlink search box on the landing page.
#[axum::debug_handler]
pub async fn resolve_shortlink(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ShortlinkRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let practitioner = service.resolve_shortlink(&request.query).await?;

    Ok(Json(json!(practitioner)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(practitioner_id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    if user.id() != practitioner_id {
        return Err(AppError::Auth(
            "Practitioners can only edit their own profile".to_string(),
        ));
    }

    let service = DirectoryService::new(&state);

    let practitioner = service.update_profile(practitioner_id, request).await?;

    Ok(Json(json!(practitioner)))
}
