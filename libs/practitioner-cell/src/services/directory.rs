use tracing::{debug, info};
use uuid::Uuid;

use shared_models::user::Practitioner;
use shared_store::{AppState, UpdateRejected};

use crate::models::{DirectoryError, UpdateProfileRequest};

pub struct DirectoryService<'a> {
    state: &'a AppState,
}

impl<'a> DirectoryService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list_practitioners(&self) -> Vec<Practitioner> {
        self.state.store.list_practitioners().await
    }

    pub async fn get_practitioner(&self, id: Uuid) -> Result<Practitioner, DirectoryError> {
        self.state
            .store
            .get_practitioner(id)
            .await
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }

    /// Resolve an affiliate slug (from a `/ph/{slug}` referral link) to its
    /// practitioner. Case-insensitive exact match.
    pub async fn resolve_affiliate(&self, slug: &str) -> Result<Practitioner, DirectoryError> {
        debug!("Resolving affiliate slug '{}'", slug);
        self.state
            .store
            .find_practitioner_by_affiliate(slug)
            .await
            .ok_or_else(|| DirectoryError::AffiliateNotFound(slug.to_string()))
    }

    /// Resolve free-text shortlink input: a bare slug or any path containing
    /// one. The last `/`-delimited segment, lowercased, is the candidate.
    pub async fn resolve_shortlink(&self, query: &str) -> Result<Practitioner, DirectoryError> {
        let candidate = query
            .trim()
            .split('/')
            .next_back()
            .unwrap_or_default()
            .to_lowercase();

        if candidate.is_empty() {
            return Err(DirectoryError::AffiliateNotFound(query.trim().to_string()));
        }

        self.resolve_affiliate(&candidate).await
    }

    /// Apply a profile edit. Distributor choice must belong to the service
    /// province; changing province invalidates any prior distributor choice.
    pub async fn update_profile(
        &self,
        practitioner_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<Practitioner, DirectoryError> {
        debug!("Updating practitioner profile: {}", practitioner_id);

        if let Some(province) = &request.service_province {
            if !self.state.reference.is_known_province(province) {
                return Err(DirectoryError::UnknownProvince(province.clone()));
            }
        }

        let reference = &self.state.reference;
        let updated = self
            .state
            .store
            .update_practitioner(practitioner_id, |practitioner| {
                if let Some(specialty) = request.specialty.clone() {
                    practitioner.specialty = specialty;
                }
                if let Some(bio) = request.bio.clone() {
                    practitioner.bio = bio;
                }
                if let Some(fee) = request.consultation_fee {
                    if fee < 0.0 {
                        return Err(DirectoryError::ValidationError(
                            "Consultation fee cannot be negative".to_string(),
                        ));
                    }
                    practitioner.consultation_fee = Some(fee);
                }
                if let Some(province) = request.service_province.clone() {
                    if practitioner.service_province.as_deref() != Some(province.as_str()) {
                        // Province moved; the old warehouse no longer applies.
                        practitioner.chosen_distributor_id = None;
                    }
                    practitioner.service_province = Some(province);
                }
                if let Some(distributor_id) = request.chosen_distributor_id {
                    let distributor = reference
                        .distributor(distributor_id)
                        .ok_or(DirectoryError::UnknownDistributor(distributor_id))?;
                    let province = practitioner.service_province.clone().ok_or_else(|| {
                        DirectoryError::ValidationError(
                            "Choose a service province before a distributor".to_string(),
                        )
                    })?;
                    if distributor.province != province {
                        return Err(DirectoryError::DistributorOutsideProvince {
                            distributor: distributor_id,
                            distributor_province: distributor.province.clone(),
                            province,
                        });
                    }
                    practitioner.chosen_distributor_id = Some(distributor_id);
                }
                Ok(())
            })
            .await
            .map_err(|e| match e {
                UpdateRejected::NotFound => DirectoryError::NotFound(practitioner_id.to_string()),
                UpdateRejected::Rejected(inner) => inner,
            })?;

        info!("Practitioner {} profile updated", practitioner_id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_store::AppState;

    async fn state() -> AppState {
        AppState::for_tests().await
    }

    #[tokio::test]
    async fn shortlink_takes_last_path_segment_case_insensitively() {
        let state = state().await;
        let service = DirectoryService::new(&state);

        let direct = service.resolve_shortlink("Jintana-Sukjai").await.unwrap();
        let pathed = service
            .resolve_shortlink("https://medici.example/ph/JINTANA-SUKJAI")
            .await
            .unwrap();

        assert_eq!(direct.id, pathed.id);
        assert_eq!(direct.affiliate_id, "jintana-sukjai");
    }

    #[tokio::test]
    async fn unknown_shortlink_is_a_lookup_miss() {
        let state = state().await;
        let service = DirectoryService::new(&state);

        let result = service.resolve_shortlink("/ph/nobody-here").await;
        assert_matches!(result, Err(DirectoryError::AffiliateNotFound(_)));
    }

    #[tokio::test]
    async fn changing_province_clears_distributor_choice() {
        let state = state().await;
        let service = DirectoryService::new(&state);
        let practitioner = state.store.list_practitioners().await[0].clone();
        assert!(practitioner.chosen_distributor_id.is_some());

        let updated = service
            .update_profile(
                practitioner.id,
                UpdateProfileRequest {
                    specialty: None,
                    bio: None,
                    consultation_fee: None,
                    service_province: Some("Phuket".to_string()),
                    chosen_distributor_id: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.service_province.as_deref(), Some("Phuket"));
        assert_eq!(updated.chosen_distributor_id, None);
    }

    #[tokio::test]
    async fn distributor_must_serve_the_chosen_province() {
        let state = state().await;
        let service = DirectoryService::new(&state);
        let practitioner = state.store.list_practitioners().await[0].clone();
        let before = practitioner.clone();
        // A warehouse from a different province than the practitioner's.
        let foreign = state
            .reference
            .distributors
            .iter()
            .find(|d| Some(&d.province) != practitioner.service_province.as_ref())
            .unwrap();

        let result = service
            .update_profile(
                practitioner.id,
                UpdateProfileRequest {
                    specialty: None,
                    bio: None,
                    consultation_fee: None,
                    service_province: None,
                    chosen_distributor_id: Some(foreign.id),
                },
            )
            .await;

        assert_matches!(result, Err(DirectoryError::DistributorOutsideProvince { .. }));
        assert_eq!(
            state.store.get_practitioner(before.id).await.unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn province_and_matching_distributor_can_move_together() {
        let state = state().await;
        let service = DirectoryService::new(&state);
        let practitioner = state.store.list_practitioners().await[0].clone();
        let khon_kaen = state
            .reference
            .distributors
            .iter()
            .find(|d| d.province == "Khon Kaen")
            .unwrap();

        let updated = service
            .update_profile(
                practitioner.id,
                UpdateProfileRequest {
                    specialty: None,
                    bio: None,
                    consultation_fee: None,
                    service_province: Some("Khon Kaen".to_string()),
                    chosen_distributor_id: Some(khon_kaen.id),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.chosen_distributor_id, Some(khon_kaen.id));
    }
}
