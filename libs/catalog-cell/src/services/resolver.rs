use tracing::debug;

use shared_models::product::{FulfillmentSource, Product};
use shared_models::user::Practitioner;
use shared_store::ReferenceData;

use crate::models::CatalogError;

/// Pure view filter over the product reference data. Never mutates anything.
pub struct CatalogResolver<'a> {
    reference: &'a ReferenceData,
}

impl<'a> CatalogResolver<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    /// Products purchasable by this practitioner in the requested view.
    ///
    /// Central view: central catalog entries of the practitioner's chosen
    /// distributor; no chosen distributor means an empty catalog, not an
    /// error. Local view: the facility's own shelf inventory; requesting it
    /// for an independent practitioner is a caller error.
    pub fn resolve(
        &self,
        practitioner: &Practitioner,
        view: FulfillmentSource,
    ) -> Result<Vec<Product>, CatalogError> {
        debug!(
            "Resolving {} catalog view for practitioner {}",
            view, practitioner.id
        );

        match view {
            FulfillmentSource::Central => Ok(match practitioner.chosen_distributor_id {
                Some(distributor_id) => self.reference.central_products_of(distributor_id),
                None => Vec::new(),
            }),
            FulfillmentSource::Local => {
                if !practitioner.is_facility_based() {
                    return Err(CatalogError::InvalidCatalogView);
                }
                Ok(self.reference.local_inventory(practitioner.id).to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_store::seed;

    #[test]
    fn central_view_filters_by_chosen_distributor() {
        let data = seed::seed_data();
        let resolver = CatalogResolver::new(&data.reference);
        let practitioner = data.facility_practitioner();

        let products = resolver
            .resolve(practitioner, FulfillmentSource::Central)
            .unwrap();

        assert!(!products.is_empty());
        for product in &products {
            assert_eq!(product.source, FulfillmentSource::Central);
            assert_eq!(product.distributor_id, practitioner.chosen_distributor_id);
        }
    }

    #[test]
    fn central_view_without_distributor_is_empty_not_an_error() {
        let data = seed::seed_data();
        let resolver = CatalogResolver::new(&data.reference);
        let mut practitioner = data.independent_practitioner().clone();
        practitioner.chosen_distributor_id = None;

        let products = resolver
            .resolve(&practitioner, FulfillmentSource::Central)
            .unwrap();

        assert!(products.is_empty());
    }

    #[test]
    fn local_view_returns_facility_inventory() {
        let data = seed::seed_data();
        let resolver = CatalogResolver::new(&data.reference);
        let practitioner = data.facility_practitioner();

        let products = resolver
            .resolve(practitioner, FulfillmentSource::Local)
            .unwrap();

        assert!(!products.is_empty());
        for product in &products {
            assert_eq!(product.source, FulfillmentSource::Local);
        }
    }

    #[test]
    fn local_view_for_independent_practitioner_is_rejected() {
        let data = seed::seed_data();
        let resolver = CatalogResolver::new(&data.reference);
        let practitioner = data.independent_practitioner();

        let result = resolver.resolve(practitioner, FulfillmentSource::Local);

        assert_matches!(result, Err(CatalogError::InvalidCatalogView));
    }

    #[test]
    fn views_never_mix_sources() {
        let data = seed::seed_data();
        let resolver = CatalogResolver::new(&data.reference);
        let practitioner = data.facility_practitioner();

        let central = resolver
            .resolve(practitioner, FulfillmentSource::Central)
            .unwrap();
        let local = resolver
            .resolve(practitioner, FulfillmentSource::Local)
            .unwrap();

        assert!(central.iter().all(|p| p.source == FulfillmentSource::Central));
        assert!(local.iter().all(|p| p.source == FulfillmentSource::Local));
        // The dual-sourced product appears in both views as distinct entries.
        let shared_name = "Vitamin C 1000mg";
        assert!(central.iter().any(|p| p.name == shared_name));
        assert!(local.iter().any(|p| p.name == shared_name));
    }
}
