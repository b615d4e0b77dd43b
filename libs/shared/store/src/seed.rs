use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use shared_models::order::{Order, OrderItem, OrderStatus};
use shared_models::product::{Distributor, FulfillmentSource, Product, ProductCategory};
use shared_models::user::{
    Patient, Practitioner, PractitionerRole, PractitionerType, VerificationStatus,
};

use crate::reference::ReferenceData;

/// Everything a fresh session starts from: static reference data plus the
/// roster snapshots that get loaded into the session store.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub reference: ReferenceData,
    pub patients: Vec<Patient>,
    pub practitioners: Vec<Practitioner>,
}

impl SeedData {
    pub fn facility_practitioner(&self) -> &Practitioner {
        self.practitioners
            .iter()
            .find(|p| p.practitioner_type == PractitionerType::FacilityBased)
            .expect("seed data contains a facility-based practitioner")
    }

    pub fn independent_practitioner(&self) -> &Practitioner {
        self.practitioners
            .iter()
            .find(|p| p.practitioner_type == PractitionerType::Independent)
            .expect("seed data contains an independent practitioner")
    }
}

fn central(
    name: &str,
    price: f64,
    description: &str,
    category: ProductCategory,
    distributor_id: Uuid,
) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        description: description.to_string(),
        category,
        source: FulfillmentSource::Central,
        distributor_id: Some(distributor_id),
    }
}

fn local(name: &str, price: f64, description: &str, category: ProductCategory) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        description: description.to_string(),
        category,
        source: FulfillmentSource::Local,
        distributor_id: None,
    }
}

pub fn seed_data() -> SeedData {
    let provinces: Vec<String> = [
        "Bangkok",
        "Chiang Mai",
        "Chiang Rai",
        "Khon Kaen",
        "Nakhon Ratchasima",
        "Phuket",
        "Songkhla",
        "Surat Thani",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect();

    let distributors = vec![
        Distributor {
            id: Uuid::new_v4(),
            name: "Metro Bangkok Warehouse".to_string(),
            province: "Bangkok".to_string(),
        },
        Distributor {
            id: Uuid::new_v4(),
            name: "Northern Warehouse (Chiang Mai)".to_string(),
            province: "Chiang Mai".to_string(),
        },
        Distributor {
            id: Uuid::new_v4(),
            name: "Northeastern Warehouse (Khon Kaen)".to_string(),
            province: "Khon Kaen".to_string(),
        },
        Distributor {
            id: Uuid::new_v4(),
            name: "Southern Warehouse (Songkhla)".to_string(),
            province: "Songkhla".to_string(),
        },
    ];
    let (bkk, cnx, kkc, hdy) = (
        distributors[0].id,
        distributors[1].id,
        distributors[2].id,
        distributors[3].id,
    );

    use ProductCategory::*;
    let central_products = vec![
        central("Vitamin C 1000mg", 120.0, "Immune support vitamin C", GeneralHealth, bkk),
        central("B Complex", 85.0, "Nervous system support", GeneralHealth, bkk),
        central("Fish Oil 1000mg", 250.0, "Brain and joint support", GeneralHealth, cnx),
        central("Anti-Acne Serum", 450.0, "Serum for acne-prone skin", Cosmetic, kkc),
        central("Digital Thermometer", 150.0, "Digital fever thermometer", MedicalDevice, hdy),
        central("Collagen Peptide", 550.0, "Skin-nourishing collagen peptide", GeneralHealth, bkk),
        central("Zinc 15mg", 180.0, "Immune and skin support", GeneralHealth, cnx),
        central("Moisturizing Cream 50g", 320.0, "Hydrating facial cream", Cosmetic, bkk),
        central("Sunscreen SPF50+ PA++++", 490.0, "High-protection sunscreen", Cosmetic, bkk),
        central("Blood Pressure Monitor", 1200.0, "Automatic blood pressure monitor", MedicalDevice, kkc),
        central("Herbal Relaxation Tea", 150.0, "Calming herbal tea blend", GeneralHealth, cnx),
        central("Probiotics 30 Capsules", 650.0, "Gut flora balance", GeneralHealth, hdy),
        central("Artificial Tears Eye Drops", 75.0, "Relief for dry eyes", MedicalDevice, bkk),
        central("Alcohol Hand Sanitizer 500ml", 99.0, "Sanitizing hand gel", GeneralHealth, kkc),
        central("KF94 Face Mask (Pack of 10)", 120.0, "KF94 protective masks", MedicalDevice, hdy),
        central("Calcium + D3", 280.0, "Bone support calcium with vitamin D3", GeneralHealth, bkk),
        central("Omega-3 (Algae Oil)", 450.0, "Vegan omega-3 from algae", GeneralHealth, cnx),
        central("Anti-Hair Fall Shampoo", 290.0, "Shampoo for hair-loss concerns", Cosmetic, bkk),
        central("Glucosamine Sulfate 1500mg", 580.0, "Joint support glucosamine", GeneralHealth, hdy),
        central("Melatonin 5mg", 350.0, "Sleep support melatonin", GeneralHealth, kkc),
    ];

    let practitioners = vec![
        Practitioner {
            id: Uuid::new_v4(),
            name: "Somchai Jaidee".to_string(),
            email: "somchai.p@pharmacy.co".to_string(),
            avatar_url: "https://picsum.photos/id/1005/200/200".to_string(),
            practitioner_role: PractitionerRole::Pharmacist,
            practitioner_type: PractitionerType::FacilityBased,
            verification_status: VerificationStatus::Verified,
            specialty: "Cardiac medication, non-formulary drugs, medical nutrition".to_string(),
            affiliate_id: "somchai-jaidee".to_string(),
            bio: "Pharmacist specialising in chronic-disease medication management."
                .to_string(),
            consultation_fee: None,
            facility_name: Some("Jaidee Pharmacy".to_string()),
            service_province: Some("Bangkok".to_string()),
            chosen_distributor_id: Some(bkk),
        },
        Practitioner {
            id: Uuid::new_v4(),
            name: "Jintana Sukjai".to_string(),
            email: "jintana.s@clinic.th".to_string(),
            avatar_url: "https://picsum.photos/id/1011/200/200".to_string(),
            practitioner_role: PractitionerRole::Doctor,
            practitioner_type: PractitionerType::Independent,
            verification_status: VerificationStatus::Verified,
            specialty: "Dermatology, cosmeceuticals, anti-aging".to_string(),
            affiliate_id: "jintana-sukjai".to_string(),
            bio: "Dermatologist advising on holistic skin care.".to_string(),
            consultation_fee: Some(500.0),
            facility_name: None,
            service_province: Some("Chiang Mai".to_string()),
            chosen_distributor_id: Some(cnx),
        },
        Practitioner {
            id: Uuid::new_v4(),
            name: "Naree Srisawat".to_string(),
            email: "naree.s@health.co".to_string(),
            avatar_url: "https://picsum.photos/id/1012/200/200".to_string(),
            practitioner_role: PractitionerRole::Nurse,
            practitioner_type: PractitionerType::Independent,
            verification_status: VerificationStatus::Pending,
            specialty: "Elderly care, supplements, wound care".to_string(),
            affiliate_id: "naree-srisawat".to_string(),
            bio: "Registered nurse experienced in convalescent care.".to_string(),
            consultation_fee: Some(250.0),
            facility_name: None,
            service_province: Some("Bangkok".to_string()),
            chosen_distributor_id: Some(bkk),
        },
    ];

    // The facility's shelf stock, including a locally-priced duplicate of a
    // central catalog entry (distinct entry, not merged).
    let facility_id = practitioners[0].id;
    let mut local_inventories = HashMap::new();
    local_inventories.insert(
        facility_id,
        vec![
            local("Paracetamol 500mg", 10.0, "Pain and fever relief", DangerousDrug),
            local("Amoxicillin 500mg", 50.0, "Antibiotic for bacterial infections", DangerousDrug),
            local("Loratadine 10mg", 35.0, "Allergy relief antihistamine", DangerousDrug),
            local("Ibuprofen 400mg", 25.0, "Pain and inflammation relief", DangerousDrug),
            local("Vitamin C 1000mg", 130.0, "Vitamin C (shelf stock)", GeneralHealth),
        ],
    );

    let patients = vec![
        Patient {
            id: Uuid::new_v4(),
            name: "Somsri Meesuk".to_string(),
            email: "somsri.m@email.com".to_string(),
            avatar_url: "https://picsum.photos/id/1027/200/200".to_string(),
            drug_allergies: "Penicillin".to_string(),
            chronic_diseases: "Hypertension".to_string(),
            address: "123/45 Sukhumvit Rd, Khlong Toei, Bangkok 10110".to_string(),
            national_id: "1234567890123".to_string(),
            phone: "0812345678".to_string(),
        },
        Patient {
            id: Uuid::new_v4(),
            name: "Somchai Thodsob".to_string(),
            email: "somchai.t@email.com".to_string(),
            avatar_url: "https://picsum.photos/id/1006/200/200".to_string(),
            drug_allergies: "None".to_string(),
            chronic_diseases: "Migraine".to_string(),
            address: "555/99 Ratchadaphisek Rd, Din Daeng, Bangkok 10400".to_string(),
            national_id: "9876543210987".to_string(),
            phone: "0898765432".to_string(),
        },
    ];

    SeedData {
        reference: ReferenceData {
            central_products,
            local_inventories,
            distributors,
            provinces,
        },
        patients,
        practitioners,
    }
}

/// Fixture builder shared by store tests.
pub fn sample_order(seed: &SeedData) -> Order {
    let product = seed.reference.central_products[0].clone();
    let mut order = Order {
        id: format!("ORD-{}", Uuid::new_v4().simple()),
        consultation_id: Uuid::new_v4(),
        patient: seed.patients[0].clone(),
        practitioner: seed.practitioners[1].clone(),
        items: vec![OrderItem {
            product,
            quantity: 1,
            practitioner_discount: None,
        }],
        products_cost: 0.0,
        consultation_fee: seed.practitioners[1].effective_consultation_fee(),
        total_discount: 0.0,
        total_cost: 0.0,
        status: OrderStatus::PaymentPending,
        soap_note: None,
        fulfillment_source: FulfillmentSource::Central,
        delivery_method: None,
        delivery_address: None,
        shipping_cost: None,
        messenger_info: None,
        version: 0,
        created_at: Utc::now(),
    };
    order.recompute_totals();
    order
}
