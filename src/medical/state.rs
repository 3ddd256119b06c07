//! Per-character medical state: organs, vitals, and active conditions

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::core::config::config;
use crate::core::error::Result;
use crate::medical::anatomy::{Anatomy, Capacity};
use crate::medical::condition::{Condition, ConditionKind, ConditionRecord};
use crate::medical::damage::InjuryType;
use crate::medical::organ::Organ;

pub const MAX_BLOOD: f32 = 100.0;

/// Coarse health classification for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicalStatus {
    Deceased,
    Unconscious,
    Critical,
    Serious,
    Injured,
    Stable,
    Optimal,
    Healthy,
}

impl MedicalStatus {
    pub fn label(self) -> &'static str {
        match self {
            MedicalStatus::Deceased => "DECEASED",
            MedicalStatus::Unconscious => "UNCONSCIOUS",
            MedicalStatus::Critical => "CRITICAL",
            MedicalStatus::Serious => "SERIOUS",
            MedicalStatus::Injured => "INJURED",
            MedicalStatus::Stable => "STABLE",
            MedicalStatus::Optimal => "OPTIMAL",
            MedicalStatus::Healthy => "HEALTHY",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicalState {
    organs: Vec<Organ>,
    blood_level: f32,
    pain_level: f32,
    consciousness: f32,
    conditions: Vec<Condition>,
}

impl Default for MedicalState {
    fn default() -> Self {
        Self::new(&Anatomy::human())
    }
}

impl MedicalState {
    pub fn new(anatomy: &Anatomy) -> Self {
        Self {
            organs: anatomy.organs.iter().map(Organ::from_def).collect(),
            blood_level: MAX_BLOOD,
            pain_level: 0.0,
            consciousness: 1.0,
            conditions: Vec::new(),
        }
    }

    // === ACCESSORS ===

    pub fn organs(&self) -> &[Organ] {
        &self.organs
    }

    pub fn organ(&self, name: &str) -> Option<&Organ> {
        self.organs.iter().find(|o| o.name == name)
    }

    pub fn organ_mut(&mut self, name: &str) -> Option<&mut Organ> {
        self.organs.iter_mut().find(|o| o.name == name)
    }

    /// Organs contained in a body location, in anatomy order
    pub fn organs_in<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a Organ> + 'a {
        self.organs.iter().filter(move |o| o.container == location)
    }

    pub fn has_location(&self, location: &str) -> bool {
        self.organs.iter().any(|o| o.container == location)
    }

    pub fn blood_level(&self) -> f32 {
        self.blood_level
    }

    /// Set blood level, clamped to 0..=100
    pub fn set_blood_level(&mut self, level: f32) {
        self.blood_level = level.clamp(0.0, MAX_BLOOD);
    }

    pub fn lose_blood(&mut self, amount: u32) {
        self.set_blood_level(self.blood_level - amount as f32);
    }

    pub fn pain_level(&self) -> f32 {
        self.pain_level
    }

    pub fn consciousness(&self) -> f32 {
        self.consciousness
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }

    // === CONDITIONS ===

    /// Add a condition. The dead accumulate nothing new.
    pub fn add_condition(&mut self, condition: Condition) -> bool {
        if self.is_dead() {
            return false;
        }
        self.conditions.push(condition);
        true
    }

    /// Drop every condition of the given variant, returning how many went
    pub fn remove_conditions_by_kind(&mut self, kind: &ConditionKind) -> usize {
        let before = self.conditions.len();
        self.conditions.retain(|c| !c.kind.same_variant(kind));
        before - self.conditions.len()
    }

    pub fn remove_ended_conditions(&mut self) -> usize {
        let before = self.conditions.len();
        self.conditions.retain(|c| !c.should_end());
        before - self.conditions.len()
    }

    /// Set the environmental risk multiplier on every infection
    pub fn set_infection_risk(&mut self, modifier: f32) {
        for condition in &mut self.conditions {
            condition.set_environmental_risk(modifier);
        }
    }

    pub fn has_active_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    // === DAMAGE ===

    /// Damage one organ without spawning conditions. Returns true if destroyed.
    pub(crate) fn damage_organ(&mut self, name: &str, amount: u32) -> bool {
        match self.organ_mut(name) {
            Some(organ) => organ.take_damage(amount),
            None => false,
        }
    }

    /// Damage a single organ directly and refresh vitals.
    ///
    /// Returns true if this damage destroyed the organ. Unknown organs are ignored.
    pub fn take_organ_damage(&mut self, name: &str, amount: u32, injury_type: InjuryType) -> bool {
        if self.organ(name).is_none() {
            tracing::debug!(organ = name, "damage to unknown organ ignored");
            return false;
        }
        let destroyed = self.damage_organ(name, amount);
        tracing::debug!(organ = name, amount, ?injury_type, destroyed, "organ damaged");
        self.update_vital_signs();
        destroyed
    }

    // === CAPACITIES & VITALS ===

    /// Capacity as a fraction 0.0..=1.0: the average functionality of the
    /// organs providing it. A body with no such organs is unaffected.
    pub fn capacity(&self, capacity: Capacity) -> f32 {
        let (sum, count) = self
            .organs
            .iter()
            .filter(|o| o.capacity == Some(capacity))
            .fold((0.0f32, 0u32), |(sum, count), o| (sum + o.functionality(), count + 1));
        if count == 0 {
            1.0
        } else {
            sum / count as f32
        }
    }

    /// Capacity by name. Unknown names report no capacity.
    pub fn calculate_body_capacity(&self, name: &str) -> f32 {
        match name.parse::<Capacity>() {
            Ok(capacity) => self.capacity(capacity),
            Err(_) => {
                tracing::warn!(capacity = name, "unknown body capacity requested");
                0.0
            }
        }
    }

    /// Recompute pain and consciousness from organs, blood, and conditions
    pub fn update_vital_signs(&mut self) {
        let cfg = config();

        self.pain_level = self.conditions.iter().map(Condition::pain_contribution).sum();

        let blood_factor = ((self.blood_level - cfg.blood_consciousness_floor)
            / (cfg.blood_consciousness_full - cfg.blood_consciousness_floor))
            .clamp(0.0, 1.0);
        let pain_factor = (1.0 - self.pain_level / cfg.pain_knockout).clamp(0.0, 1.0);
        let breathing = if self.capacity(Capacity::Breathing) > 0.0 { 1.0 } else { 0.0 };

        self.consciousness = (self.capacity(Capacity::Consciousness) * blood_factor * pain_factor * breathing).clamp(0.0, 1.0);
    }

    pub fn is_dead(&self) -> bool {
        self.blood_level <= config().fatal_blood_level
            || self.capacity(Capacity::BloodPumping) <= 0.0
            || self.capacity(Capacity::Consciousness) <= 0.0
            || self.capacity(Capacity::Breathing) <= 0.0
    }

    pub fn is_unconscious(&self) -> bool {
        !self.is_dead() && self.consciousness < config().unconscious_threshold
    }

    /// Able to act in combat
    pub fn is_active(&self) -> bool {
        !self.is_dead() && !self.is_unconscious()
    }

    pub fn status(&self) -> MedicalStatus {
        if self.is_dead() {
            return MedicalStatus::Deceased;
        }
        if self.is_unconscious() {
            return MedicalStatus::Unconscious;
        }

        let blood = self.blood_level;
        let pain = self.pain_level;
        let consciousness = self.consciousness;

        if blood < 30.0 || consciousness < 0.4 {
            return MedicalStatus::Critical;
        }
        if blood < 60.0 || pain > 60.0 || consciousness < 0.7 {
            return MedicalStatus::Serious;
        }
        if !self.conditions.is_empty() {
            if blood < 80.0 || pain > 30.0 {
                return MedicalStatus::Injured;
            }
            return MedicalStatus::Stable;
        }
        if blood >= 95.0 && pain <= 5.0 && consciousness >= 0.95 {
            return MedicalStatus::Optimal;
        }
        MedicalStatus::Healthy
    }

    /// Multi-line plain-text summary for medical displays
    pub fn status_summary(&self) -> String {
        if self.is_dead() {
            return MedicalStatus::Deceased.label().to_string();
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", if self.is_unconscious() { "UNCONSCIOUS" } else { "CONSCIOUS" });
        let _ = writeln!(out, "Blood Level: {:.1}%", self.blood_level);
        let _ = writeln!(out, "Pain Level: {:.1}", self.pain_level);
        let _ = writeln!(out, "Consciousness: {:.1}%", self.consciousness * 100.0);

        if !self.conditions.is_empty() {
            let _ = writeln!(out, "Active Conditions:");
            for condition in &self.conditions {
                let _ = writeln!(out, "  {condition}");
            }
        }

        let damaged: Vec<&Organ> = self.organs.iter().filter(|o| o.current_hp() < o.max_hp()).collect();
        if !damaged.is_empty() {
            let _ = writeln!(out, "Damaged Organs:");
            for organ in damaged {
                let _ = writeln!(out, "  {}: {}/{} HP", organ.name, organ.current_hp(), organ.max_hp());
            }
        }

        out.trim_end().to_string()
    }

    // === PERSISTENCE ===

    pub fn to_record(&self) -> MedicalRecord {
        MedicalRecord {
            organs: self.organs.clone(),
            blood_level: self.blood_level,
            pain_level: self.pain_level,
            consciousness: self.consciousness,
            conditions: self.conditions.iter().map(Condition::to_record).collect(),
        }
    }

    pub fn from_record(record: &MedicalRecord) -> Result<Self> {
        let conditions = record
            .conditions
            .iter()
            .map(Condition::from_record)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            organs: record.organs.clone(),
            blood_level: record.blood_level.clamp(0.0, MAX_BLOOD),
            pain_level: record.pain_level.max(0.0),
            consciousness: record.consciousness.clamp(0.0, 1.0),
            conditions,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: MedicalRecord = serde_json::from_str(json)?;
        Self::from_record(&record)
    }
}

/// Persisted form of a medical state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub organs: Vec<Organ>,
    pub blood_level: f32,
    pub pain_level: f32,
    pub consciousness: f32,
    pub conditions: Vec<ConditionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_optimal() {
        let mut state = MedicalState::default();
        state.update_vital_signs();
        assert_eq!(state.status(), MedicalStatus::Optimal);
        assert!(!state.is_dead());
        assert!(!state.is_unconscious());
        assert_eq!(state.consciousness(), 1.0);
    }

    #[test]
    fn test_infection_alone_causes_no_pain() {
        let mut state = MedicalState::default();
        state.add_condition(Condition::infection(6, Some("left_arm")));
        state.update_vital_signs();

        assert_eq!(state.pain_level(), 0.0);
        assert_eq!(state.consciousness(), 1.0);
        assert_eq!(state.status(), MedicalStatus::Stable);
    }

    #[test]
    fn test_heart_destruction_kills() {
        let mut state = MedicalState::default();
        assert!(state.take_organ_damage("heart", 100, InjuryType::Bullet));
        assert!(state.is_dead());
        assert_eq!(state.status(), MedicalStatus::Deceased);
        assert_eq!(state.status_summary(), "DECEASED");
    }

    #[test]
    fn test_losing_both_lungs_kills() {
        let mut state = MedicalState::default();
        state.take_organ_damage("left_lung", 20, InjuryType::Blade);
        assert!(!state.is_dead());
        state.take_organ_damage("right_lung", 20, InjuryType::Blade);
        assert!(state.is_dead());
    }

    #[test]
    fn test_unknown_organ_ignored() {
        let mut state = MedicalState::default();
        assert!(!state.take_organ_damage("spleen", 5, InjuryType::Generic));
        assert!(!state.is_dead());
    }

    #[test]
    fn test_capacity_averages_organs() {
        let mut state = MedicalState::default();
        state.take_organ_damage("left_eye", 5, InjuryType::Pierce);
        assert!((state.capacity(Capacity::Sight) - 0.5).abs() < 1e-6);
        assert!((state.calculate_body_capacity("sight") - 0.5).abs() < 1e-6);
        assert_eq!(state.calculate_body_capacity("telepathy"), 0.0);
    }

    #[test]
    fn test_blood_loss_drops_consciousness() {
        let mut state = MedicalState::default();
        state.set_blood_level(55.0);
        state.update_vital_signs();
        assert!((state.consciousness() - 0.5).abs() < 1e-6);
        assert_eq!(state.status(), MedicalStatus::Serious);

        state.set_blood_level(30.0);
        state.update_vital_signs();
        assert!(state.is_unconscious());
        assert_eq!(state.status(), MedicalStatus::Unconscious);

        state.set_blood_level(15.0);
        assert!(state.is_dead());
    }

    #[test]
    fn test_pain_sums_condition_contributions() {
        let mut state = MedicalState::default();
        state.add_condition(Condition::pain(6, Some("chest")));
        state.add_condition(Condition::bleeding(5, Some("chest")));
        state.update_vital_signs();
        // 6 + max(1, 5 / 2)
        assert_eq!(state.pain_level(), 8.0);
        assert_eq!(state.status(), MedicalStatus::Stable);
    }

    #[test]
    fn test_dead_accept_no_conditions() {
        let mut state = MedicalState::default();
        state.set_blood_level(0.0);
        assert!(!state.add_condition(Condition::pain(3, None)));
        assert!(state.conditions().is_empty());
    }

    #[test]
    fn test_remove_conditions_by_kind() {
        let mut state = MedicalState::default();
        state.add_condition(Condition::pain(3, None));
        state.add_condition(Condition::infection(2, None));
        state.add_condition(Condition::pain(1, None));

        let removed = state.remove_conditions_by_kind(&ConditionKind::Pain);

        assert_eq!(removed, 2);
        assert_eq!(state.conditions().len(), 1);
        assert_eq!(state.conditions()[0].kind.type_name(), "infection");
    }

    #[test]
    fn test_json_round_trip_preserves_everything() {
        let mut state = MedicalState::default();
        state.take_organ_damage("liver", 7, InjuryType::Blade);
        state.set_blood_level(81.5);
        state.add_condition(Condition::bleeding(3, Some("abdomen")));
        state.add_condition(Condition::pain(4, Some("abdomen")));
        let mut infection = Condition::infection(2, Some("abdomen"));
        infection.treated = true;
        state.add_condition(infection);
        state.update_vital_signs();

        let json = state.to_json().unwrap();
        let restored = MedicalState::from_json(&json).unwrap();

        assert_eq!(restored, state);
        assert_eq!(restored.organ("liver").unwrap().current_hp(), 13);
    }
}
