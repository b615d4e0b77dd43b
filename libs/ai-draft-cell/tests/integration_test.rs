use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_draft_cell::router::ai_routes;
use shared_config::AppConfig;
use shared_store::AppState;

const NOTE: &str = "S: acne. O: -. A: mild acne. P: topical care.";

async fn app_against(server: &MockServer) -> (Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(AppConfig {
            gemini_api_key: "test-key".to_string(),
            gemini_base_url: server.uri(),
            port: 0,
        })
        .await,
    );
    (ai_routes(state.clone()), state)
}

async fn summary_response(app: Router, state: &AppState) -> Value {
    let patient = state.store.list_patients().await[0].clone();
    let request = Request::builder()
        .method("POST")
        .uri("/summary")
        .header("X-User-Id", patient.id.to_string())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "soap_note": NOTE }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn summary_passes_through_when_upstream_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Apply the serum nightly." }] }
            }]
        })))
        .mount(&server)
        .await;
    let (app, state) = app_against(&server).await;

    let body = summary_response(app, &state).await;
    assert_eq!(body["summary"], "Apply the serum nightly.");
    assert_eq!(body["fallback"], false);
}

#[tokio::test]
async fn summary_falls_back_to_the_raw_note_when_upstream_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let (app, state) = app_against(&server).await;

    let body = summary_response(app, &state).await;
    assert_eq!(body["summary"], NOTE);
    assert_eq!(body["fallback"], true);
}

#[tokio::test]
async fn summary_falls_back_when_ai_is_not_configured() {
    let state = Arc::new(AppState::for_tests().await);
    let app = ai_routes(state.clone());

    let body = summary_response(app, &state).await;
    assert_eq!(body["summary"], NOTE);
    assert_eq!(body["fallback"], true);
}
