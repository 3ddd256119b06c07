//! Damage distribution from a struck body location into its organs
//!
//! `apply_anatomical_damage` is the single entry point external damage
//! sources go through: it spreads the hit over functional organs, spawns
//! wound conditions, and refreshes vital signs.

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::dice::Dice;
use crate::medical::condition::Condition;
use crate::medical::state::MedicalState;

/// Kind of wound a hit produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryType {
    Generic,
    Blunt,
    Blade,
    Pierce,
    Bullet,
    Burn,
}

impl InjuryType {
    /// Wounds that break the skin and can become infected
    pub fn is_penetrating(self) -> bool {
        matches!(self, InjuryType::Blade | InjuryType::Pierce | InjuryType::Bullet)
    }
}

/// How an application of damage turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Damage landed on at least one organ
    Applied,
    /// Zero damage was requested
    NoDamage,
    /// Every organ in the location was already destroyed; nothing happened
    LocationDestroyed,
    /// The body has no such location
    UnknownLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub location: String,
    pub outcome: DamageOutcome,
    pub organs_damaged: Vec<(String, u32)>,
    pub organs_destroyed: Vec<String>,
    pub conditions_added: Vec<Condition>,
    pub total_damage: u32,
}

impl DamageReport {
    fn empty(location: &str, outcome: DamageOutcome) -> Self {
        Self {
            location: location.to_string(),
            outcome,
            organs_damaged: Vec::new(),
            organs_destroyed: Vec::new(),
            conditions_added: Vec::new(),
            total_damage: 0,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.outcome != DamageOutcome::Applied
    }

    /// Short description for the victim
    pub fn describe(&self) -> String {
        match self.outcome {
            DamageOutcome::LocationDestroyed => {
                format!("No damage applied - all organs in {} are already destroyed", self.location)
            }
            DamageOutcome::UnknownLocation => format!("No damage applied - no {} to hit", self.location),
            DamageOutcome::NoDamage => "No damage applied".to_string(),
            DamageOutcome::Applied => {
                let mut text = format!("{} damage to {}", self.total_damage, self.location);
                if !self.organs_destroyed.is_empty() {
                    text.push_str(&format!(" ({} destroyed)", self.organs_destroyed.join(", ")));
                }
                text
            }
        }
    }
}

/// Split `total` damage across a location's functional organs.
///
/// An explicitly targeted organ that is still functional takes everything.
/// Otherwise each organ takes its floored hit-weight share and the last organ
/// takes the remainder, so the parts always sum to `total`. Returns an empty
/// list when every organ in the location is destroyed.
pub fn distribute_damage_to_organs(
    state: &MedicalState,
    location: &str,
    total: u32,
    target_organ: Option<&str>,
) -> Vec<(String, u32)> {
    if let Some(name) = target_organ {
        if let Some(organ) = state.organ(name) {
            if organ.container == location && organ.is_functional() {
                return vec![(organ.name.clone(), total)];
            }
        }
    }

    let functional: Vec<_> = state.organs_in(location).filter(|o| o.is_functional()).collect();
    let Some((last, rest)) = functional.split_last() else {
        return Vec::new();
    };

    let total_weight: u64 = functional.iter().map(|o| o.hit_weight.value() as u64).sum();
    let mut assigned = 0u32;
    let mut shares = Vec::with_capacity(functional.len());

    for organ in rest {
        let share = (organ.hit_weight.value() as u64 * total as u64 / total_weight) as u32;
        assigned += share;
        shares.push((organ.name.clone(), share));
    }
    shares.push((last.name.clone(), total - assigned));

    shares
}

/// Conditions produced by a single wound
pub fn create_conditions_from_damage(
    amount: u32,
    injury_type: InjuryType,
    location: &str,
    dice: &mut dyn Dice,
) -> Vec<Condition> {
    let cfg = config();
    let mut conditions = Vec::new();
    let damage = amount as i32;

    if amount >= cfg.minor_bleeding_threshold {
        let severity = (damage / 3).clamp(1, cfg.max_bleeding_severity);
        conditions.push(Condition::bleeding(severity, Some(location)));
    }

    if amount > 0 {
        let severity = (damage / 2).clamp(1, cfg.max_pain_severity);
        conditions.push(Condition::pain(severity, Some(location)));
    }

    if injury_type.is_penetrating()
        && amount >= cfg.infection_damage_threshold
        && dice.chance(cfg.infection_chance_percent)
    {
        let severity = dice.roll(cfg.infection_max_initial_severity) as i32;
        conditions.push(Condition::infection(severity, Some(location)));
    }

    conditions
}

/// Apply a hit to a body location and everything that follows from it
pub fn apply_anatomical_damage(
    state: &mut MedicalState,
    amount: u32,
    location: &str,
    injury_type: InjuryType,
    target_organ: Option<&str>,
    dice: &mut dyn Dice,
) -> DamageReport {
    if !state.has_location(location) {
        tracing::debug!(location, "damage to unknown body location ignored");
        return DamageReport::empty(location, DamageOutcome::UnknownLocation);
    }
    if amount == 0 {
        return DamageReport::empty(location, DamageOutcome::NoDamage);
    }

    let shares = distribute_damage_to_organs(state, location, amount, target_organ);
    if shares.is_empty() {
        tracing::debug!(location, "all organs already destroyed, no damage applied");
        return DamageReport::empty(location, DamageOutcome::LocationDestroyed);
    }

    let mut report = DamageReport::empty(location, DamageOutcome::Applied);
    for (organ, damage) in shares {
        if damage == 0 {
            continue;
        }
        if state.damage_organ(&organ, damage) {
            report.organs_destroyed.push(organ.clone());
        }
        report.total_damage += damage;
        report.organs_damaged.push((organ, damage));
    }

    for condition in create_conditions_from_damage(amount, injury_type, location, dice) {
        if state.add_condition(condition.clone()) {
            report.conditions_added.push(condition);
        }
    }

    state.update_vital_signs();

    tracing::debug!(
        location,
        amount,
        ?injury_type,
        organs = report.organs_damaged.len(),
        destroyed = report.organs_destroyed.len(),
        conditions = report.conditions_added.len(),
        "anatomical damage applied"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::medical::anatomy::{Anatomy, HitWeight, OrganDef};
    use crate::medical::condition::ConditionKind;

    fn twin_chest() -> MedicalState {
        MedicalState::new(&Anatomy::new(vec![
            OrganDef::new("left_lung", "chest", 20, HitWeight::Common, None),
            OrganDef::new("right_lung", "chest", 20, HitWeight::Common, None),
        ]))
    }

    #[test]
    fn test_equal_weights_split_evenly() {
        let state = twin_chest();
        let shares = distribute_damage_to_organs(&state, "chest", 12, None);
        assert_eq!(shares, vec![("left_lung".to_string(), 6), ("right_lung".to_string(), 6)]);
    }

    #[test]
    fn test_remainder_goes_to_last_organ() {
        let state = twin_chest();
        let shares = distribute_damage_to_organs(&state, "chest", 13, None);
        assert_eq!(shares, vec![("left_lung".to_string(), 6), ("right_lung".to_string(), 7)]);
    }

    #[test]
    fn test_human_chest_distribution_sums() {
        let state = MedicalState::default();
        let shares = distribute_damage_to_organs(&state, "chest", 17, None);
        // heart 10, lungs 60 each
        assert_eq!(shares[0], ("heart".to_string(), 1));
        assert_eq!(shares.iter().map(|(_, d)| d).sum::<u32>(), 17);
    }

    #[test]
    fn test_targeted_organ_takes_everything() {
        let state = MedicalState::default();
        let shares = distribute_damage_to_organs(&state, "chest", 9, Some("heart"));
        assert_eq!(shares, vec![("heart".to_string(), 9)]);
    }

    #[test]
    fn test_destroyed_target_falls_back_to_spread() {
        let mut state = twin_chest();
        state.damage_organ("left_lung", 20);
        let shares = distribute_damage_to_organs(&state, "chest", 9, Some("left_lung"));
        assert_eq!(shares, vec![("right_lung".to_string(), 9)]);
    }

    #[test]
    fn test_bullet_to_chest_splits_and_spawns_conditions() {
        let mut state = twin_chest();
        // Infection check fails
        let mut dice = ScriptedDice::new([100]);
        let report = apply_anatomical_damage(&mut state, 12, "chest", InjuryType::Bullet, None, &mut dice);

        assert_eq!(report.outcome, DamageOutcome::Applied);
        assert_eq!(report.total_damage, 12);
        assert_eq!(state.organ("left_lung").unwrap().current_hp(), 14);
        assert_eq!(state.organ("right_lung").unwrap().current_hp(), 14);

        let kinds: Vec<&str> = report.conditions_added.iter().map(|c| c.kind.type_name()).collect();
        assert_eq!(kinds, vec!["bleeding", "pain"]);
        assert_eq!(report.conditions_added[0].severity, 4);
        assert_eq!(report.conditions_added[1].severity, 6);
    }

    #[test]
    fn test_penetrating_wound_can_infect() {
        let mut state = MedicalState::default();
        // 25 passes the 25% check, then severity roll of 2
        let mut dice = ScriptedDice::new([25, 2]);
        let report = apply_anatomical_damage(&mut state, 8, "abdomen", InjuryType::Blade, None, &mut dice);
        let infection = report
            .conditions_added
            .iter()
            .find(|c| matches!(c.kind, ConditionKind::Infection { .. }))
            .unwrap();
        assert_eq!(infection.severity, 2);
    }

    #[test]
    fn test_blunt_wounds_never_infect() {
        let mut dice = ScriptedDice::new([1, 1]);
        let conditions = create_conditions_from_damage(20, InjuryType::Blunt, "head", &mut dice);
        assert_eq!(conditions.len(), 2);
        assert_eq!(dice.remaining(), 2);
    }

    #[test]
    fn test_small_hit_only_hurts() {
        let mut dice = ScriptedDice::default();
        let conditions = create_conditions_from_damage(3, InjuryType::Blade, "left_hand", &mut dice);
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].kind, ConditionKind::Pain);
        assert_eq!(conditions[0].severity, 1);
    }

    #[test]
    fn test_severity_caps() {
        let mut dice = ScriptedDice::new([100]);
        let conditions = create_conditions_from_damage(90, InjuryType::Blunt, "chest", &mut dice);
        assert_eq!(conditions[0].severity, 10);
        assert_eq!(conditions[1].severity, 8);
    }

    #[test]
    fn test_destroyed_location_is_flagged_noop() {
        let mut state = twin_chest();
        state.damage_organ("left_lung", 20);
        state.damage_organ("right_lung", 20);
        let mut dice = ScriptedDice::default();

        let report = apply_anatomical_damage(&mut state, 10, "chest", InjuryType::Blade, None, &mut dice);

        assert_eq!(report.outcome, DamageOutcome::LocationDestroyed);
        assert_eq!(report.total_damage, 0);
        assert!(report.is_noop());
        assert!(report.describe().contains("already destroyed"));
    }

    #[test]
    fn test_zero_damage_is_distinct_from_destroyed() {
        let mut state = twin_chest();
        let mut dice = ScriptedDice::default();
        let report = apply_anatomical_damage(&mut state, 0, "chest", InjuryType::Blade, None, &mut dice);
        assert_eq!(report.outcome, DamageOutcome::NoDamage);
    }

    #[test]
    fn test_unknown_location_is_ignored() {
        let mut state = twin_chest();
        let mut dice = ScriptedDice::default();
        let report = apply_anatomical_damage(&mut state, 5, "tail", InjuryType::Blade, None, &mut dice);
        assert_eq!(report.outcome, DamageOutcome::UnknownLocation);
        assert!(state.conditions().is_empty());
    }
}
