use tracing::debug;
use uuid::Uuid;

use shared_models::user::Patient;
use shared_store::{AppState, UpdateRejected};

use crate::models::{PatientError, UpdatePatientRequest};

pub struct PatientService<'a> {
    state: &'a AppState,
}

impl<'a> PatientService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient profile: {}", patient_id);
        self.state
            .store
            .get_patient(patient_id)
            .await
            .ok_or_else(|| PatientError::NotFound(patient_id.to_string()))
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile: {}", patient_id);

        if let Some(phone) = &request.phone {
            if phone.trim().is_empty() {
                return Err(PatientError::ValidationError(
                    "Phone number cannot be empty".to_string(),
                ));
            }
        }

        self.state
            .store
            .update_patient(patient_id, |patient| {
                if let Some(allergies) = request.drug_allergies.clone() {
                    patient.drug_allergies = allergies;
                }
                if let Some(diseases) = request.chronic_diseases.clone() {
                    patient.chronic_diseases = diseases;
                }
                if let Some(address) = request.address.clone() {
                    patient.address = address;
                }
                if let Some(phone) = request.phone.clone() {
                    patient.phone = phone;
                }
                Ok::<(), PatientError>(())
            })
            .await
            .map_err(|e| match e {
                UpdateRejected::NotFound => PatientError::NotFound(patient_id.to_string()),
                UpdateRejected::Rejected(inner) => inner,
            })
    }
}
