use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::CurrentUser;
use shared_store::AppState;

/// Mock-session authentication: the `X-User-Id` header names a roster member
/// and becomes the request's `CurrentUser` extension. Real login is an
/// external collaborator; this middleware is its stand-in.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get("X-User-Id")
        .ok_or_else(|| AppError::Auth("Missing X-User-Id header".to_string()))?;

    let raw = header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid X-User-Id header format".to_string()))?;

    let user_id = Uuid::parse_str(raw).map_err(|_| {
        warn!("Session rejected: X-User-Id '{}' is not a valid user id", raw);
        AppError::Auth("X-User-Id is not a valid user id".to_string())
    })?;

    let user = resolve_user(&state, user_id).await.ok_or_else(|| {
        warn!("Session rejected: no roster member with id {}", user_id);
        AppError::Auth(format!("Unknown user: {}", user_id))
    })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

async fn resolve_user(state: &AppState, user_id: Uuid) -> Option<CurrentUser> {
    if let Some(patient) = state.store.get_patient(user_id).await {
        return Some(CurrentUser::Patient(patient));
    }
    state
        .store
        .get_practitioner(user_id)
        .await
        .map(CurrentUser::Practitioner)
}
