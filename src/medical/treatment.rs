//! Treatment quality, medical items, and treatment skill checks

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::dice::Dice;
use crate::medical::condition::ConditionKind;
use crate::medical::state::MedicalState;

/// How well a treatment was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentQuality {
    Poor,
    Adequate,
    Good,
    Excellent,
}

impl TreatmentQuality {
    /// Fraction of severity removed by a treatment of this quality
    pub fn effectiveness(self) -> f32 {
        let table = &config().treatment_effectiveness;
        match self {
            TreatmentQuality::Poor => table.poor,
            TreatmentQuality::Adequate => table.adequate,
            TreatmentQuality::Good => table.good,
            TreatmentQuality::Excellent => table.excellent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentOutcome {
    Success,
    PartialSuccess,
    Failure,
}

impl TreatmentOutcome {
    /// Quality of care delivered by this outcome, if any
    pub fn quality(self) -> Option<TreatmentQuality> {
        match self {
            TreatmentOutcome::Success => Some(TreatmentQuality::Good),
            TreatmentOutcome::PartialSuccess => Some(TreatmentQuality::Poor),
            TreatmentOutcome::Failure => None,
        }
    }
}

/// Result of a treatment skill check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreatmentRoll {
    pub roll: i32,
    pub medical_skill: i32,
    pub total: i32,
    pub difficulty: i32,
    pub outcome: TreatmentOutcome,
}

/// Roll 3d6 plus medical skill (twice intellect) against the item's difficulty
pub fn calculate_treatment_success(intellect: i32, item_effectiveness: i32, dice: &mut dyn Dice) -> TreatmentRoll {
    let cfg = config();
    let medical_skill = intellect * 2;
    let difficulty = cfg.treatment_base_difficulty - item_effectiveness;
    let roll = dice.roll_many(3, 6) as i32;
    let total = roll + medical_skill;

    let outcome = if total >= difficulty + cfg.treatment_full_success_margin {
        TreatmentOutcome::Success
    } else if total >= difficulty {
        TreatmentOutcome::PartialSuccess
    } else {
        TreatmentOutcome::Failure
    };

    tracing::debug!(roll, medical_skill, difficulty, ?outcome, "treatment check");

    TreatmentRoll {
        roll,
        medical_skill,
        total,
        difficulty,
        outcome,
    }
}

/// Consumable medical supplies with fixed effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicalItem {
    /// Transfusion: restores blood and slows the worst bleeds
    BloodRestoration,
    PainRelief,
    WoundCare,
    Antiseptic,
    /// Speeds recovery of every kind of condition a little
    HealingAcceleration,
}

impl MedicalItem {
    /// Item quality, subtracted from the treatment difficulty
    pub fn effectiveness(self) -> i32 {
        match self {
            MedicalItem::BloodRestoration => 6,
            MedicalItem::PainRelief => 5,
            MedicalItem::WoundCare => 4,
            MedicalItem::Antiseptic => 5,
            MedicalItem::HealingAcceleration => 7,
        }
    }

    /// (condition filter, max conditions affected, severity reduction)
    fn condition_effect(self) -> (Option<ConditionKind>, usize, i32) {
        let infection = ConditionKind::Infection {
            risk: 1.0,
            baseline_established: false,
        };
        match self {
            MedicalItem::BloodRestoration => (Some(ConditionKind::Bleeding), 2, 3),
            MedicalItem::PainRelief => (Some(ConditionKind::Pain), 3, 2),
            MedicalItem::WoundCare => (Some(ConditionKind::Bleeding), 1, 2),
            MedicalItem::Antiseptic => (Some(infection), 2, 3),
            MedicalItem::HealingAcceleration => (None, 3, 1),
        }
    }

    fn blood_restored(self) -> f32 {
        match self {
            MedicalItem::BloodRestoration => 25.0,
            _ => 0.0,
        }
    }
}

/// What an item application changed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemReport {
    pub conditions_affected: usize,
    pub blood_restored: f32,
}

/// Apply a medical item's effects, then refresh vitals
pub fn apply_medical_item(state: &mut MedicalState, item: MedicalItem) -> ItemReport {
    let (filter, limit, reduction) = item.condition_effect();
    let mut report = ItemReport::default();

    if state.is_dead() {
        return report;
    }

    for condition in state.conditions_mut().iter_mut() {
        if report.conditions_affected >= limit {
            break;
        }
        let matches = filter.as_ref().map_or(true, |kind| kind.same_variant(&condition.kind));
        if matches && condition.severity > 0 {
            condition.reduce(reduction);
            report.conditions_affected += 1;
        }
    }

    let restored = item.blood_restored();
    if restored > 0.0 {
        let before = state.blood_level();
        state.set_blood_level(before + restored);
        report.blood_restored = state.blood_level() - before;
    }

    state.remove_ended_conditions();
    state.update_vital_signs();
    report
}
