use std::collections::HashMap;

use uuid::Uuid;

use shared_models::product::{Distributor, Product};

/// Read-only reference data provided whole at session start: the central
/// product catalog, per-facility local inventories, the distributor list and
/// the province enumeration. Rosters are seeded into the session store
/// instead, because profile edits mutate them.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub central_products: Vec<Product>,
    pub local_inventories: HashMap<Uuid, Vec<Product>>,
    pub distributors: Vec<Distributor>,
    pub provinces: Vec<String>,
}

impl ReferenceData {
    pub fn central_product(&self, id: Uuid) -> Option<&Product> {
        self.central_products.iter().find(|p| p.id == id)
    }

    /// Central catalog entries belonging to one distributor.
    pub fn central_products_of(&self, distributor_id: Uuid) -> Vec<Product> {
        self.central_products
            .iter()
            .filter(|p| p.distributor_id == Some(distributor_id))
            .cloned()
            .collect()
    }

    pub fn local_inventory(&self, practitioner_id: Uuid) -> &[Product] {
        self.local_inventories
            .get(&practitioner_id)
            .map(|products| products.as_slice())
            .unwrap_or(&[])
    }

    pub fn local_product(&self, practitioner_id: Uuid, product_id: Uuid) -> Option<&Product> {
        self.local_inventory(practitioner_id)
            .iter()
            .find(|p| p.id == product_id)
    }

    pub fn distributor(&self, id: Uuid) -> Option<&Distributor> {
        self.distributors.iter().find(|d| d.id == id)
    }

    pub fn is_known_province(&self, province: &str) -> bool {
        self.provinces.iter().any(|p| p == province)
    }
}
