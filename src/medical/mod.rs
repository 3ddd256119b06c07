//! Anatomical damage and condition engine
//!
//! Organs grouped by body location, weighted hit selection, damage
//! distribution, and tick-driven conditions (bleeding, pain, infection).

pub mod anatomy;
pub mod condition;
pub mod damage;
pub mod organ;
pub mod state;
pub mod targeting;
pub mod ticker;
pub mod treatment;

pub use anatomy::{Anatomy, Capacity, HitWeight, OrganDef};
pub use condition::{Condition, ConditionKind, ConditionRecord};
pub use damage::{
    apply_anatomical_damage, create_conditions_from_damage, distribute_damage_to_organs, DamageOutcome,
    DamageReport, InjuryType,
};
pub use organ::Organ;
pub use state::{MedicalRecord, MedicalState, MedicalStatus};
pub use targeting::{select_hit_location, select_target_organ};
pub use ticker::{tick_conditions, TickReport};
pub use treatment::{
    apply_medical_item, calculate_treatment_success, MedicalItem, TreatmentOutcome, TreatmentQuality,
};
