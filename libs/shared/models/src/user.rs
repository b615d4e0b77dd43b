use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Practitioner,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PractitionerRole {
    Doctor,
    Pharmacist,
    Nurse,
}

impl fmt::Display for PractitionerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PractitionerRole::Doctor => write!(f, "doctor"),
            PractitionerRole::Pharmacist => write!(f, "pharmacist"),
            PractitionerRole::Nurse => write!(f, "nurse"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PractitionerType {
    Independent,
    FacilityBased,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub drug_allergies: String,
    pub chronic_diseases: String,
    pub address: String,
    pub national_id: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Practitioner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub practitioner_role: PractitionerRole,
    pub practitioner_type: PractitionerType,
    pub verification_status: VerificationStatus,
    pub specialty: String,
    pub affiliate_id: String,
    pub bio: String,
    /// Only meaningful for independent practitioners.
    pub consultation_fee: Option<f64>,
    /// Only meaningful for facility-based practitioners.
    pub facility_name: Option<String>,
    pub service_province: Option<String>,
    pub chosen_distributor_id: Option<Uuid>,
}

impl Practitioner {
    pub fn is_facility_based(&self) -> bool {
        self.practitioner_type == PractitionerType::FacilityBased
    }

    pub fn effective_consultation_fee(&self) -> f64 {
        self.consultation_fee.unwrap_or(0.0)
    }
}

/// The authenticated session identity, tagged by role. Role-specific fields
/// live only on their variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum CurrentUser {
    Patient(Patient),
    Practitioner(Practitioner),
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        match self {
            CurrentUser::Patient(p) => p.id,
            CurrentUser::Practitioner(p) => p.id,
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            CurrentUser::Patient(_) => UserRole::Patient,
            CurrentUser::Practitioner(_) => UserRole::Practitioner,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CurrentUser::Patient(p) => &p.name,
            CurrentUser::Practitioner(p) => &p.name,
        }
    }
}
