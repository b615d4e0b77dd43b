use tracing::info;

use shared_config::AppConfig;

use crate::reference::ReferenceData;
use crate::seed;
use crate::store::SessionStore;

/// Shared application state handed to every router: configuration, the
/// static reference data and the session store with seeded rosters.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub reference: ReferenceData,
    pub store: SessionStore,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Self {
        let data = seed::seed_data();
        let store = SessionStore::new();
        for patient in &data.patients {
            store.insert_patient(patient.clone()).await;
        }
        for practitioner in &data.practitioners {
            store.insert_practitioner(practitioner.clone()).await;
        }
        info!(
            "Session state initialised: {} patients, {} practitioners, {} central products",
            data.patients.len(),
            data.practitioners.len(),
            data.reference.central_products.len()
        );
        Self {
            config,
            reference: data.reference,
            store,
        }
    }

    /// State with an empty AI configuration, for tests that never reach the
    /// collaborator.
    pub async fn for_tests() -> Self {
        Self::new(AppConfig {
            gemini_api_key: String::new(),
            gemini_base_url: String::new(),
            port: 0,
        })
        .await
    }
}
