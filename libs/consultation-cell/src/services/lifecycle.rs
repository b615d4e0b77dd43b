use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::consultation::{Consultation, ConsultationStatus};
use shared_models::user::Patient;
use shared_store::{AppState, UpdateRejected};

use crate::models::{ConsultationError, CreateConsultationRequest};

/// Owns the consultation state machine: pending -> active -> finished, with
/// reject and refer as pending -> finished side paths. `finished` is terminal.
pub struct ConsultationLifecycleService<'a> {
    state: &'a AppState,
}

impl<'a> ConsultationLifecycleService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(current: &ConsultationStatus) -> Vec<ConsultationStatus> {
        match current {
            ConsultationStatus::Pending => {
                vec![ConsultationStatus::Active, ConsultationStatus::Finished]
            }
            ConsultationStatus::Active => vec![ConsultationStatus::Finished],
            // Terminal - no transitions allowed
            ConsultationStatus::Finished => vec![],
        }
    }

    fn validate_transition(
        current: &ConsultationStatus,
        new: &ConsultationStatus,
    ) -> Result<(), ConsultationError> {
        if !Self::valid_transitions(current).contains(new) {
            warn!("Invalid consultation transition attempted: {} -> {}", current, new);
            return Err(ConsultationError::InvalidStatusTransition {
                from: *current,
                to: *new,
            });
        }
        Ok(())
    }

    /// A patient submits preliminary info and a consultation type for a
    /// chosen practitioner; the consultation enters the pending queue.
    pub async fn create(
        &self,
        patient: &Patient,
        request: CreateConsultationRequest,
    ) -> Result<Consultation, ConsultationError> {
        let practitioner = self
            .state
            .store
            .get_practitioner(request.practitioner_id)
            .await
            .ok_or(ConsultationError::PractitionerNotFound(
                request.practitioner_id,
            ))?;

        let consultation = Consultation {
            id: Uuid::new_v4(),
            patient: patient.clone(),
            practitioner,
            consultation_type: request.consultation_type,
            preliminary_info: request.preliminary_info,
            status: ConsultationStatus::Pending,
            version: 0,
            created_at: Utc::now(),
        };

        info!(
            "Consultation {} created for practitioner {}",
            consultation.id, consultation.practitioner.id
        );
        self.state.store.insert_consultation(consultation.clone()).await;
        Ok(consultation)
    }

    pub async fn get(&self, id: Uuid) -> Result<Consultation, ConsultationError> {
        self.state
            .store
            .get_consultation(id)
            .await
            .ok_or(ConsultationError::NotFound(id))
    }

    /// Pending consultations waiting for this practitioner. Active and
    /// finished consultations never appear here, only in lookups by id.
    pub async fn pending_queue(&self, practitioner_id: Uuid) -> Vec<Consultation> {
        self.state
            .store
            .list_consultations(|c| {
                c.practitioner.id == practitioner_id && c.status == ConsultationStatus::Pending
            })
            .await
    }

    /// Practitioner picks a pending consultation from the queue.
    pub async fn accept(&self, id: Uuid) -> Result<Consultation, ConsultationError> {
        debug!("Accepting consultation {}", id);
        self.transition(id, ConsultationStatus::Active).await
    }

    /// Practitioner rejects a pending consultation. No order is produced.
    pub async fn reject(&self, id: Uuid, reason: &str) -> Result<Consultation, ConsultationError> {
        if reason.trim().is_empty() {
            return Err(ConsultationError::EmptyRejectReason);
        }

        let rejected = self.apply(id, |consultation| {
            if consultation.status != ConsultationStatus::Pending {
                return Err(ConsultationError::InvalidStatusTransition {
                    from: consultation.status,
                    to: ConsultationStatus::Finished,
                });
            }
            consultation.status = ConsultationStatus::Finished;
            Ok(())
        })
        .await?;

        info!("Consultation {} rejected: {}", id, reason);
        Ok(rejected)
    }

    /// Practitioner refers a pending consultation to a different roster
    /// member. Re-routing to the target is a fresh creation event owned by
    /// the caller; the original consultation just finishes.
    pub async fn refer(
        &self,
        id: Uuid,
        target_practitioner_id: Uuid,
    ) -> Result<Consultation, ConsultationError> {
        let target = self
            .state
            .store
            .get_practitioner(target_practitioner_id)
            .await
            .ok_or(ConsultationError::PractitionerNotFound(
                target_practitioner_id,
            ))?;

        let referred = self.apply(id, |consultation| {
            if consultation.practitioner.id == target.id {
                return Err(ConsultationError::SelfReferral);
            }
            if consultation.status != ConsultationStatus::Pending {
                return Err(ConsultationError::InvalidStatusTransition {
                    from: consultation.status,
                    to: ConsultationStatus::Finished,
                });
            }
            consultation.status = ConsultationStatus::Finished;
            Ok(())
        })
        .await?;

        info!("Consultation {} referred to practitioner {}", id, target.id);
        Ok(referred)
    }

    /// Close out an active session. Called by the order cell when the
    /// practitioner completes the session and produces an order.
    pub async fn finish(&self, id: Uuid) -> Result<Consultation, ConsultationError> {
        debug!("Finishing consultation {}", id);
        self.transition(id, ConsultationStatus::Finished).await
    }

    async fn transition(
        &self,
        id: Uuid,
        new_status: ConsultationStatus,
    ) -> Result<Consultation, ConsultationError> {
        let updated = self.apply(id, |consultation| {
            Self::validate_transition(&consultation.status, &new_status)?;
            consultation.status = new_status;
            Ok(())
        })
        .await?;

        info!("Consultation {} is now {}", id, updated.status);
        Ok(updated)
    }

    async fn apply<F>(&self, id: Uuid, mutate: F) -> Result<Consultation, ConsultationError>
    where
        F: FnOnce(&mut Consultation) -> Result<(), ConsultationError>,
    {
        self.state
            .store
            .update_consultation(id, mutate)
            .await
            .map_err(|e| match e {
                UpdateRejected::NotFound => ConsultationError::NotFound(id),
                UpdateRejected::Rejected(inner) => inner,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::consultation::{ConsultationType, PreliminaryInfo};
    use shared_store::AppState;

    fn intake() -> PreliminaryInfo {
        PreliminaryInfo {
            symptoms: "Rash on both arms".to_string(),
            diseases: "None".to_string(),
            allergies: "None".to_string(),
            weight: None,
            height: None,
        }
    }

    async fn create_pending(state: &AppState) -> Consultation {
        let patient = state.store.list_patients().await[0].clone();
        let practitioner = state.store.list_practitioners().await[0].clone();
        ConsultationLifecycleService::new(state)
            .create(
                &patient,
                CreateConsultationRequest {
                    practitioner_id: practitioner.id,
                    consultation_type: ConsultationType::Video,
                    preliminary_info: intake(),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn accept_moves_pending_to_active() {
        let state = AppState::for_tests().await;
        let service = ConsultationLifecycleService::new(&state);
        let consultation = create_pending(&state).await;

        let accepted = service.accept(consultation.id).await.unwrap();
        assert_eq!(accepted.status, ConsultationStatus::Active);
    }

    #[tokio::test]
    async fn finished_is_terminal() {
        let state = AppState::for_tests().await;
        let service = ConsultationLifecycleService::new(&state);
        let consultation = create_pending(&state).await;

        service.accept(consultation.id).await.unwrap();
        service.finish(consultation.id).await.unwrap();
        let frozen = service.get(consultation.id).await.unwrap();

        let accept_again = service.accept(consultation.id).await;
        assert_matches!(
            accept_again,
            Err(ConsultationError::InvalidStatusTransition { .. })
        );
        let reject_after = service.reject(consultation.id, "too late").await;
        assert_matches!(
            reject_after,
            Err(ConsultationError::InvalidStatusTransition { .. })
        );
        // The record is byte-for-byte what it was before the attempts.
        assert_eq!(service.get(consultation.id).await.unwrap(), frozen);
    }

    #[tokio::test]
    async fn queue_lists_pending_only() {
        let state = AppState::for_tests().await;
        let service = ConsultationLifecycleService::new(&state);
        let first = create_pending(&state).await;
        let second = create_pending(&state).await;
        let practitioner_id = first.practitioner.id;

        service.accept(first.id).await.unwrap();

        let queue = service.pending_queue(practitioner_id).await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, second.id);

        // Finished consultations drop out of the queue but stay queryable.
        service.reject(second.id, "out of scope").await.unwrap();
        assert!(service.pending_queue(practitioner_id).await.is_empty());
        let archived = service.get(second.id).await.unwrap();
        assert_eq!(archived.status, ConsultationStatus::Finished);
    }

    #[tokio::test]
    async fn reject_requires_a_reason() {
        let state = AppState::for_tests().await;
        let service = ConsultationLifecycleService::new(&state);
        let consultation = create_pending(&state).await;

        let result = service.reject(consultation.id, "   ").await;
        assert_matches!(result, Err(ConsultationError::EmptyRejectReason));
        assert_eq!(
            service.get(consultation.id).await.unwrap().status,
            ConsultationStatus::Pending
        );
    }

    #[tokio::test]
    async fn referral_must_target_someone_else() {
        let state = AppState::for_tests().await;
        let service = ConsultationLifecycleService::new(&state);
        let consultation = create_pending(&state).await;

        let result = service
            .refer(consultation.id, consultation.practitioner.id)
            .await;
        assert_matches!(result, Err(ConsultationError::SelfReferral));

        let other = state
            .store
            .list_practitioners()
            .await
            .into_iter()
            .find(|p| p.id != consultation.practitioner.id)
            .unwrap();
        let referred = service.refer(consultation.id, other.id).await.unwrap();
        assert_eq!(referred.status, ConsultationStatus::Finished);
    }

    #[tokio::test]
    async fn active_consultations_cannot_be_rejected_or_referred() {
        let state = AppState::for_tests().await;
        let service = ConsultationLifecycleService::new(&state);
        let consultation = create_pending(&state).await;
        service.accept(consultation.id).await.unwrap();

        let reject = service.reject(consultation.id, "changed my mind").await;
        assert_matches!(
            reject,
            Err(ConsultationError::InvalidStatusTransition { .. })
        );

        let other = state
            .store
            .list_practitioners()
            .await
            .into_iter()
            .find(|p| p.id != consultation.practitioner.id)
            .unwrap();
        let refer = service.refer(consultation.id, other.id).await;
        assert_matches!(
            refer,
            Err(ConsultationError::InvalidStatusTransition { .. })
        );
    }
}
