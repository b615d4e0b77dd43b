use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::user::{Patient, Practitioner};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationType {
    Video,
    Voice,
    Chat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Pending,
    Active,
    Finished,
}

impl ConsultationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConsultationStatus::Finished)
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationStatus::Pending => write!(f, "pending"),
            ConsultationStatus::Active => write!(f, "active"),
            ConsultationStatus::Finished => write!(f, "finished"),
        }
    }
}

/// Intake details the patient submits before the session starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreliminaryInfo {
    pub symptoms: String,
    pub diseases: String,
    pub allergies: String,
    pub weight: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consultation {
    pub id: Uuid,
    pub patient: Patient,
    pub practitioner: Practitioner,
    pub consultation_type: ConsultationType,
    pub preliminary_info: PreliminaryInfo,
    pub status: ConsultationStatus,
    /// Bumped on every committed mutation; timers and other deferred writers
    /// re-check it before applying.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}
