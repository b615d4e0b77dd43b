use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::consultation::PreliminaryInfo;
use shared_models::product::Product;
use shared_models::user::Practitioner;

use crate::models::{AiError, PractitionerDraft};

const MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini-style draft collaborator. One attempt per call, no
/// retries; the caller decides what a failure means.
#[derive(Debug)]
pub struct AiDraftService {
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl AiDraftService {
    pub fn new(config: &AppConfig) -> Result<Self, AiError> {
        if !config.is_ai_configured() {
            return Err(AiError::NotConfigured);
        }
        Ok(Self {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        })
    }

    /// Draft SOAP note plus product suggestions for the practitioner.
    /// Suggested names outside the available set are dropped, never an error.
    pub async fn generate_draft(
        &self,
        preliminary: &PreliminaryInfo,
        practitioner: &Practitioner,
        available_products: &[Product],
    ) -> Result<PractitionerDraft, AiError> {
        debug!(
            "Requesting practitioner draft for a {} ({} products offered)",
            practitioner.practitioner_role,
            available_products.len()
        );

        let product_lines: Vec<String> = available_products
            .iter()
            .map(|p| format!("- {}: {} (Category: {})", p.name, p.description, p.category))
            .collect();

        let prompt = format!(
            "You are an expert medical assistant AI analyzing patient information \
             for a healthcare practitioner.\n\n\
             Practitioner Information:\n\
             - Role: {}\n\
             - Type: {:?}\n\
             - Specialty: {}\n\n\
             Patient Information:\n\
             - Symptoms: {}\n\
             - Chronic Diseases: {}\n\
             - Drug Allergies: {}\n\
             - Weight: {}\n\
             - Height: {}\n\n\
             Available Products/Medications:\n{}\n\n\
             Produce a single JSON object with two fields:\n\
             1. \"soapNote\": a draft SOAP (Subjective, Objective, Assessment, Plan) \
             note tailored to the practitioner's role and specialty.\n\
             2. \"suggestedProducts\": an array of exact product names from the list \
             above that are relevant and safe for this patient.",
            practitioner.practitioner_role,
            practitioner.practitioner_type,
            practitioner.specialty,
            or_not_provided(&preliminary.symptoms),
            or_not_provided(&preliminary.diseases),
            or_not_provided(&preliminary.allergies),
            preliminary
                .weight
                .as_deref()
                .map(|w| format!("{} kg", w))
                .unwrap_or_else(|| "Not provided".to_string()),
            preliminary
                .height
                .as_deref()
                .map(|h| format!("{} cm", h))
                .unwrap_or_else(|| "Not provided".to_string()),
            product_lines.join("\n"),
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.5,
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "soapNote": { "type": "STRING" },
                        "suggestedProducts": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["soapNote", "suggestedProducts"]
                }
            }
        });

        let text = self.generate_content(&body).await?;
        let parsed: Value =
            serde_json::from_str(text.trim()).map_err(|_| AiError::MalformedResponse)?;

        let soap_note = parsed["soapNote"]
            .as_str()
            .ok_or(AiError::MalformedResponse)?
            .to_string();
        let raw_suggestions = parsed["suggestedProducts"]
            .as_array()
            .ok_or(AiError::MalformedResponse)?;

        let mut suggested_products = Vec::new();
        for suggestion in raw_suggestions.iter().filter_map(|v| v.as_str()) {
            if available_products.iter().any(|p| p.name == suggestion) {
                suggested_products.push(suggestion.to_string());
            } else {
                warn!("Dropping suggested product not in the available set: {}", suggestion);
            }
        }

        Ok(PractitionerDraft {
            soap_note,
            suggested_products,
        })
    }

    /// Rewrites a technical SOAP note into patient-friendly advice.
    pub async fn summarize_for_patient(&self, soap_note: &str) -> Result<String, AiError> {
        debug!("Requesting patient summary ({} chars of note)", soap_note.len());

        let prompt = format!(
            "You are a friendly healthcare professional. Rewrite the following \
             technical SOAP note as one simple, cohesive paragraph of advice for \
             the patient. Do not use the labels \"S:\", \"O:\", \"A:\" or \"P:\". \
             Cover the key symptoms, the assessment and the recommended plan, \
             including product instructions and when to seek a doctor.\n\n\
             ---\n{}\n---",
            soap_note
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.3 }
        });

        let text = self.generate_content(&body).await?;
        Ok(text.trim().to_string())
    }

    async fn generate_content(&self, body: &Value) -> Result<String, AiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!("AI collaborator returned {}: {}", status, detail);
            return Err(AiError::Upstream(format!("status {}", status)));
        }

        let payload: Value = response.json().await?;
        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|t| t.to_string())
            .ok_or(AiError::MalformedResponse)
    }
}

fn or_not_provided(value: &str) -> &str {
    if value.trim().is_empty() {
        "Not provided"
    } else {
        value
    }
}
