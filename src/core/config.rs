//! Engine configuration with documented constants
//!
//! All magic numbers used by combat and medical resolution are collected here
//! with an explanation of what they drive. Values can be overridden from a TOML
//! document; omitted keys keep their defaults.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// Severity reduction multipliers per treatment quality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentEffectiveness {
    pub poor: f32,
    pub adequate: f32,
    pub good: f32,
    pub excellent: f32,
}

impl Default for TreatmentEffectiveness {
    fn default() -> Self {
        Self {
            poor: 0.25,
            adequate: 0.5,
            good: 0.75,
            excellent: 1.0,
        }
    }
}

/// Configuration for combat and medical resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === COMBAT ===
    /// Die rolled for initiative; motor skill is added on top
    ///
    /// Initiative is rolled once when a character joins a session and only
    /// re-rolled when they are re-added (e.g. after being dragged).
    pub initiative_die: u32,

    /// Die rolled for precision when choosing which organ a hit lands on
    pub precision_die: u32,

    /// Precision total (roll + attacker motor skill) at which the chosen organ
    /// takes the whole hit instead of the location spreading it
    pub precision_targeting_threshold: u32,

    /// Damage dealt by a bare-handed strike
    pub unarmed_damage: u32,

    // === CONDITION CREATION ===
    /// Minimum damage that opens a bleeding wound
    pub minor_bleeding_threshold: u32,

    /// Bleeding severity is damage / 3, capped here
    pub max_bleeding_severity: i32,

    /// Pain severity is damage / 2, capped here
    pub max_pain_severity: i32,

    /// Minimum penetrating damage that can become infected
    pub infection_damage_threshold: u32,

    /// Percent chance that a qualifying wound becomes infected
    pub infection_chance_percent: u32,

    /// New infections start at a random severity in 1..=this
    pub infection_max_initial_severity: u32,

    /// Untreated infections never worsen beyond this severity
    pub max_infection_severity: i32,

    // === CONDITION TICKS ===
    /// Blood lost per tick, indexed by bleeding severity - 1
    ///
    /// Severities beyond the table use the last entry.
    pub blood_loss_per_severity: Vec<u32>,

    /// Fraction of the blood-loss rate still lost once a bleed is treated
    pub treated_bleeding_factor: f32,

    /// Percent chance per tick that an untreated bleed clots a little
    pub bleeding_heal_chance: u32,

    /// Percent chance per tick that pain eases by one step
    pub pain_heal_chance: u32,

    /// Percent chance per tick that a treated infection improves
    pub treated_infection_heal_chance: u32,

    /// Percent chance per tick that an untreated infection worsens,
    /// before the environmental risk multiplier
    pub infection_base_progression: f32,

    /// Lower bound for the environmental infection risk multiplier
    pub min_infection_risk: f32,

    // === TREATMENT ===
    pub treatment_effectiveness: TreatmentEffectiveness,

    /// Extra multiplier on pain treatment (painkillers relieve more than they heal)
    pub pain_treatment_bonus: f32,

    /// Treatment difficulty before subtracting the item's effectiveness
    pub treatment_base_difficulty: i32,

    /// Margin over the difficulty that turns a partial success into a full one
    pub treatment_full_success_margin: i32,

    // === VITALS ===
    /// Blood level at or below which the character dies
    pub fatal_blood_level: f32,

    /// Consciousness below this fraction leaves the character unconscious
    pub unconscious_threshold: f32,

    /// Blood level at which blood loss alone drives consciousness to zero
    pub blood_consciousness_floor: f32,

    /// Blood level at or above which blood loss has no effect on consciousness
    pub blood_consciousness_full: f32,

    /// Total pain at which pain alone drives consciousness to zero
    pub pain_knockout: f32,

    // === SCHEDULING ===
    /// Seconds between combat rounds
    pub round_seconds: u32,

    /// Seconds between medical condition ticks
    ///
    /// Deliberately longer than a round: conditions evolve independently of
    /// combat pacing.
    pub medical_tick_seconds: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Combat
            initiative_die: 20,
            precision_die: 20,
            precision_targeting_threshold: 15,
            unarmed_damage: 2,

            // Condition creation
            minor_bleeding_threshold: 5,
            max_bleeding_severity: 10,
            max_pain_severity: 8,
            infection_damage_threshold: 8,
            infection_chance_percent: 25,
            infection_max_initial_severity: 3,
            max_infection_severity: 10,

            // Condition ticks
            blood_loss_per_severity: vec![1, 1, 2, 2, 3, 4, 5, 6, 8, 10],
            treated_bleeding_factor: 0.3,
            bleeding_heal_chance: 10,
            pain_heal_chance: 20,
            treated_infection_heal_chance: 12,
            infection_base_progression: 1.0,
            min_infection_risk: 0.1,

            // Treatment
            treatment_effectiveness: TreatmentEffectiveness::default(),
            pain_treatment_bonus: 1.5,
            treatment_base_difficulty: 15,
            treatment_full_success_margin: 5,

            // Vitals
            fatal_blood_level: 15.0,
            unconscious_threshold: 0.3,
            blood_consciousness_floor: 30.0,
            blood_consciousness_full: 80.0,
            pain_knockout: 100.0,

            // Scheduling
            round_seconds: 6,
            medical_tick_seconds: 12,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(config)
    }

    /// Blood lost per tick for a bleed of the given severity
    pub fn blood_loss_for(&self, severity: i32) -> u32 {
        if severity <= 0 {
            return 0;
        }
        let index = (severity as usize - 1).min(self.blood_loss_per_severity.len().saturating_sub(1));
        self.blood_loss_per_severity.get(index).copied().unwrap_or(1)
    }

    /// Validate that config values are sensible
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.initiative_die == 0 || self.precision_die == 0 {
            return Err("Dice must have at least one side".into());
        }

        if self.blood_loss_per_severity.is_empty() {
            return Err("blood_loss_per_severity must not be empty".into());
        }

        // Blood thresholds should be ordered
        if self.fatal_blood_level >= self.blood_consciousness_floor
            || self.blood_consciousness_floor >= self.blood_consciousness_full
        {
            return Err(format!(
                "blood thresholds must satisfy fatal ({}) < floor ({}) < full ({})",
                self.fatal_blood_level, self.blood_consciousness_floor, self.blood_consciousness_full
            ));
        }

        if !(0.0..=1.0).contains(&self.unconscious_threshold) {
            return Err(format!(
                "unconscious_threshold ({}) must be within 0..=1",
                self.unconscious_threshold
            ));
        }

        if !(0.0..=1.0).contains(&self.treated_bleeding_factor) {
            return Err("treated_bleeding_factor must be within 0..=1".into());
        }

        if self.min_infection_risk <= 0.0 {
            return Err("min_infection_risk must be positive".into());
        }

        if self.round_seconds == 0 || self.medical_tick_seconds == 0 {
            return Err("Tick intervals must be positive".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Get the global engine config (initializes with defaults if not set)
pub fn config() -> &'static EngineConfig {
    CONFIG.get_or_init(EngineConfig::default)
}

/// Set the global engine config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: EngineConfig) -> std::result::Result<(), EngineConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blood_loss_table_lookup() {
        let config = EngineConfig::default();
        assert_eq!(config.blood_loss_for(0), 0);
        assert_eq!(config.blood_loss_for(1), 1);
        assert_eq!(config.blood_loss_for(4), 2);
        assert_eq!(config.blood_loss_for(10), 10);
        // Beyond the table clamps to the last entry
        assert_eq!(config.blood_loss_for(14), 10);
    }

    #[test]
    fn test_toml_overrides_keep_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            bleeding_heal_chance = 50
            round_seconds = 3

            [treatment_effectiveness]
            good = 0.9
            "#,
        )
        .unwrap();

        assert_eq!(config.bleeding_heal_chance, 50);
        assert_eq!(config.round_seconds, 3);
        assert_eq!(config.treatment_effectiveness.good, 0.9);
        assert_eq!(config.treatment_effectiveness.poor, 0.25);
        assert_eq!(config.pain_heal_chance, 20);
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        let result = EngineConfig::from_toml_str("round_seconds = 0");
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_catches_unordered_blood_thresholds() {
        let config = EngineConfig {
            fatal_blood_level: 50.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
