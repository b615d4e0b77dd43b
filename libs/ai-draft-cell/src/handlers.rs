use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use catalog_cell::services::CatalogResolver;
use shared_models::error::AppError;
use shared_models::user::CurrentUser;
use shared_store::AppState;

use crate::models::{DraftRequest, PatientSummary, SummaryRequest};
use crate::services::AiDraftService;

#[axum::debug_handler]
pub async fn generate_draft(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<Value>, AppError> {
    let consultation = state
        .store
        .get_consultation(request.consultation_id)
        .await
        .ok_or_else(|| AppError::NotFound(request.consultation_id.to_string()))?;
    if user.id() != consultation.practitioner.id {
        return Err(AppError::Auth(
            "Only the consulting practitioner can request a draft".to_string(),
        ));
    }

    let available_products =
        CatalogResolver::new(&state.reference).resolve(&consultation.practitioner, request.view)?;

    let service = AiDraftService::new(&state.config)?;
    let draft = service
        .generate_draft(
            &consultation.preliminary_info,
            &consultation.practitioner,
            &available_products,
        )
        .await?;

    Ok(Json(json!(draft)))
}

#[axum::debug_handler]
pub async fn summarize_for_patient(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<CurrentUser>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<Value>, AppError> {
    // A failed summary falls back to the raw note; the patient always gets
    // something to read.
    let summary = match AiDraftService::new(&state.config) {
        Ok(service) => match service.summarize_for_patient(&request.soap_note).await {
            Ok(text) => PatientSummary {
                summary: text,
                fallback: false,
            },
            Err(err) => {
                warn!("Summary fallback to raw note: {}", err);
                PatientSummary {
                    summary: request.soap_note,
                    fallback: true,
                }
            }
        },
        Err(err) => {
            warn!("Summary fallback to raw note: {}", err);
            PatientSummary {
                summary: request.soap_note,
                fallback: true,
            }
        }
    };

    Ok(Json(json!(summary)))
}
