use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::consultation::Consultation;
use shared_models::order::Order;
use shared_models::user::{Patient, Practitioner};

/// Why a closure-driven update did not commit.
#[derive(Debug, PartialEq)]
pub enum UpdateRejected<E> {
    NotFound,
    /// The mutation closure refused; the stored record is untouched.
    Rejected(E),
}

/// Result of a version-guarded update attempt.
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    Applied,
    /// The record changed (or disappeared) since the version was captured.
    Stale,
}

/// In-memory session store. Created at session start, dropped at logout.
/// Each mutation is a whole-record replacement under the collection's write
/// lock; a rejected mutation leaves the stored record exactly as it was.
#[derive(Debug, Default)]
pub struct SessionStore {
    patients: RwLock<HashMap<Uuid, Patient>>,
    practitioners: RwLock<HashMap<Uuid, Practitioner>>,
    consultations: RwLock<HashMap<Uuid, Consultation>>,
    orders: RwLock<HashMap<String, Order>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- rosters ------------------------------------------------------

    pub async fn insert_patient(&self, patient: Patient) {
        self.patients.write().await.insert(patient.id, patient);
    }

    pub async fn insert_practitioner(&self, practitioner: Practitioner) {
        self.practitioners
            .write()
            .await
            .insert(practitioner.id, practitioner);
    }

    pub async fn get_patient(&self, id: Uuid) -> Option<Patient> {
        self.patients.read().await.get(&id).cloned()
    }

    pub async fn get_practitioner(&self, id: Uuid) -> Option<Practitioner> {
        self.practitioners.read().await.get(&id).cloned()
    }

    pub async fn list_patients(&self) -> Vec<Patient> {
        let mut all: Vec<Patient> = self.patients.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub async fn list_practitioners(&self) -> Vec<Practitioner> {
        let mut all: Vec<Practitioner> = self.practitioners.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub async fn find_practitioner_by_affiliate(&self, slug: &str) -> Option<Practitioner> {
        let wanted = slug.to_lowercase();
        self.practitioners
            .read()
            .await
            .values()
            .find(|p| p.affiliate_id.to_lowercase() == wanted)
            .cloned()
    }

    pub async fn update_patient<F, E>(&self, id: Uuid, mutate: F) -> Result<Patient, UpdateRejected<E>>
    where
        F: FnOnce(&mut Patient) -> Result<(), E>,
    {
        let mut guard = self.patients.write().await;
        let stored = guard.get(&id).ok_or(UpdateRejected::NotFound)?;
        let mut draft = stored.clone();
        mutate(&mut draft).map_err(UpdateRejected::Rejected)?;
        guard.insert(id, draft.clone());
        Ok(draft)
    }

    pub async fn update_practitioner<F, E>(
        &self,
        id: Uuid,
        mutate: F,
    ) -> Result<Practitioner, UpdateRejected<E>>
    where
        F: FnOnce(&mut Practitioner) -> Result<(), E>,
    {
        let mut guard = self.practitioners.write().await;
        let stored = guard.get(&id).ok_or(UpdateRejected::NotFound)?;
        let mut draft = stored.clone();
        mutate(&mut draft).map_err(UpdateRejected::Rejected)?;
        guard.insert(id, draft.clone());
        Ok(draft)
    }

    // ---- consultations ------------------------------------------------

    pub async fn insert_consultation(&self, consultation: Consultation) {
        debug!("Storing consultation {}", consultation.id);
        self.consultations
            .write()
            .await
            .insert(consultation.id, consultation);
    }

    pub async fn get_consultation(&self, id: Uuid) -> Option<Consultation> {
        self.consultations.read().await.get(&id).cloned()
    }

    pub async fn list_consultations<F>(&self, keep: F) -> Vec<Consultation>
    where
        F: Fn(&Consultation) -> bool,
    {
        let mut matched: Vec<Consultation> = self
            .consultations
            .read()
            .await
            .values()
            .filter(|c| keep(c))
            .cloned()
            .collect();
        matched.sort_by_key(|c| c.created_at);
        matched
    }

    /// Read-validate-write on a single consultation. The closure runs against
    /// a draft copy; only a successful closure commits (with a version bump).
    pub async fn update_consultation<F, E>(
        &self,
        id: Uuid,
        mutate: F,
    ) -> Result<Consultation, UpdateRejected<E>>
    where
        F: FnOnce(&mut Consultation) -> Result<(), E>,
    {
        let mut guard = self.consultations.write().await;
        let stored = guard.get(&id).ok_or(UpdateRejected::NotFound)?;
        let mut draft = stored.clone();
        mutate(&mut draft).map_err(UpdateRejected::Rejected)?;
        draft.version = stored.version + 1;
        guard.insert(id, draft.clone());
        Ok(draft)
    }

    // ---- orders -------------------------------------------------------

    pub async fn insert_order(&self, order: Order) {
        debug!("Storing order {}", order.id);
        self.orders.write().await.insert(order.id.clone(), order);
    }

    pub async fn get_order(&self, id: &str) -> Option<Order> {
        self.orders.read().await.get(id).cloned()
    }

    pub async fn list_orders<F>(&self, keep: F) -> Vec<Order>
    where
        F: Fn(&Order) -> bool,
    {
        let mut matched: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| keep(o))
            .cloned()
            .collect();
        matched.sort_by_key(|o| o.created_at);
        matched
    }

    pub async fn update_order<F, E>(&self, id: &str, mutate: F) -> Result<Order, UpdateRejected<E>>
    where
        F: FnOnce(&mut Order) -> Result<(), E>,
    {
        let mut guard = self.orders.write().await;
        let stored = guard.get(id).ok_or(UpdateRejected::NotFound)?;
        let mut draft = stored.clone();
        mutate(&mut draft).map_err(UpdateRejected::Rejected)?;
        draft.version = stored.version + 1;
        guard.insert(id.to_string(), draft.clone());
        Ok(draft)
    }

    /// Version-guarded variant for deferred writers (auto-advance timers).
    /// If the order is gone or has moved on since `expected_version` was
    /// captured, the update is silently skipped.
    pub async fn update_order_if_version<F>(
        &self,
        id: &str,
        expected_version: u64,
        mutate: F,
    ) -> UpdateOutcome
    where
        F: FnOnce(&mut Order) -> Result<(), ()>,
    {
        let mut guard = self.orders.write().await;
        let stored = match guard.get(id) {
            Some(order) if order.version == expected_version => order,
            _ => return UpdateOutcome::Stale,
        };
        let mut draft = stored.clone();
        if mutate(&mut draft).is_err() {
            return UpdateOutcome::Stale;
        }
        draft.version = stored.version + 1;
        guard.insert(id.to_string(), draft.clone());
        UpdateOutcome::Applied
    }
}
