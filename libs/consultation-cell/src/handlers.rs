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

use crate::models::{
    CreateConsultationRequest, ReferConsultationRequest, RejectConsultationRequest,
};
use crate::services::ConsultationLifecycleService;

#[axum::debug_handler]
pub async fn create_consultation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    let CurrentUser::Patient(patient) = user else {
        return Err(AppError::Auth(
            "Only patients can request a consultation".to_string(),
        ));
    };

    let service = ConsultationLifecycleService::new(&state);

    let consultation = service.create(&patient, request).await?;

    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(consultation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationLifecycleService::new(&state);

    let consultation = service.get(consultation_id).await?;

    if user.id() != consultation.patient.id && user.id() != consultation.practitioner.id {
        return Err(AppError::Auth(
            "Only the participants can view a consultation".to_string(),
        ));
    }

    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn get_pending_queue(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if user.id() != practitioner_id {
        return Err(AppError::Auth(
            "Practitioners can only view their own queue".to_string(),
        ));
    }

    let service = ConsultationLifecycleService::new(&state);

    let queue = service.pending_queue(practitioner_id).await;

    Ok(Json(json!(queue)))
}

#[axum::debug_handler]
pub async fn accept_consultation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(consultation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationLifecycleService::new(&state);

    require_assigned_practitioner(&service, &user, consultation_id).await?;
    let consultation = service.accept(consultation_id).await?;

    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn reject_consultation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(consultation_id): Path<Uuid>,
    Json(request): Json<RejectConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationLifecycleService::new(&state);

    require_assigned_practitioner(&service, &user, consultation_id).await?;
    let consultation = service.reject(consultation_id, &request.reason).await?;

    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn refer_consultation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(consultation_id): Path<Uuid>,
    Json(request): Json<ReferConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationLifecycleService::new(&state);

    require_assigned_practitioner(&service, &user, consultation_id).await?;
    let consultation = service
        .refer(consultation_id, request.practitioner_id)
        .await?;

    Ok(Json(json!(consultation)))
}

async fn require_assigned_practitioner(
    service: &ConsultationLifecycleService<'_>,
    user: &CurrentUser,
    consultation_id: Uuid,
) -> Result<(), AppError> {
    let consultation = service.get(consultation_id).await?;
    if user.id() != consultation.practitioner.id {
        return Err(AppError::Auth(
            "Only the assigned practitioner can act on this consultation".to_string(),
        ));
    }
    Ok(())
}
