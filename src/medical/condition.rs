//! Time-progressing medical conditions
//!
//! Conditions are a closed set of variants dispatched through one
//! tick/treat/end interface. Adding a variant means extending every match here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::config;
use crate::core::dice::Dice;
use crate::core::error::{EngineError, Result};
use crate::medical::treatment::TreatmentQuality;

/// Condition variant plus any variant-specific state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionKind {
    Bleeding,
    Pain,
    Infection {
        /// Environmental risk multiplier (dirty surroundings worsen infections)
        risk: f32,
        /// The first tick only establishes a baseline
        baseline_established: bool,
    },
}

impl ConditionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConditionKind::Bleeding => "bleeding",
            ConditionKind::Pain => "pain",
            ConditionKind::Infection { .. } => "infection",
        }
    }

    /// Same variant, ignoring variant state
    pub fn same_variant(&self, other: &ConditionKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// What a single tick did to the owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEffect {
    pub blood_loss: u32,
    pub severity_change: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub severity: i32,
    /// Severity at creation, kept for reference
    pub max_severity: i32,
    pub location: Option<String>,
    pub treated: bool,
}

impl Condition {
    fn new(kind: ConditionKind, severity: i32, location: Option<&str>) -> Self {
        Self {
            kind,
            severity,
            max_severity: severity,
            location: location.map(str::to_string),
            treated: false,
        }
    }

    pub fn bleeding(severity: i32, location: Option<&str>) -> Self {
        Self::new(ConditionKind::Bleeding, severity, location)
    }

    pub fn pain(severity: i32, location: Option<&str>) -> Self {
        Self::new(ConditionKind::Pain, severity, location)
    }

    pub fn infection(severity: i32, location: Option<&str>) -> Self {
        Self::new(
            ConditionKind::Infection {
                risk: 1.0,
                baseline_established: false,
            },
            severity,
            location,
        )
    }

    /// Blood lost per tick at the current severity
    pub fn blood_loss_rate(&self) -> u32 {
        match self.kind {
            ConditionKind::Bleeding => config().blood_loss_for(self.severity),
            _ => 0,
        }
    }

    /// Contribution to the owner's total pain
    pub fn pain_contribution(&self) -> f32 {
        if self.severity <= 0 {
            return 0.0;
        }
        match self.kind {
            ConditionKind::Pain => self.severity as f32,
            ConditionKind::Bleeding => (self.severity / 2).max(1) as f32,
            ConditionKind::Infection { .. } => 0.0,
        }
    }

    /// Advance the condition by one medical tick
    pub fn tick(&mut self, dice: &mut dyn Dice) -> TickEffect {
        let cfg = config();
        let before = self.severity;
        let mut effect = TickEffect::default();

        match &mut self.kind {
            ConditionKind::Bleeding => {
                let rate = cfg.blood_loss_for(self.severity);
                effect.blood_loss = if self.treated {
                    (rate as f32 * cfg.treated_bleeding_factor) as u32
                } else {
                    rate
                };
                if !self.treated && dice.chance(cfg.bleeding_heal_chance) {
                    self.severity -= 1;
                }
            }
            ConditionKind::Pain => {
                if dice.chance(cfg.pain_heal_chance) {
                    self.severity -= 1;
                }
            }
            ConditionKind::Infection {
                risk,
                baseline_established,
            } => {
                if !*baseline_established {
                    *baseline_established = true;
                } else if self.treated {
                    if dice.chance(cfg.treated_infection_heal_chance) {
                        self.severity -= 1;
                    }
                } else {
                    // Resolution of 1/100th of a percent
                    let threshold = (cfg.infection_base_progression * (*risk).max(cfg.min_infection_risk) * 100.0) as u32;
                    if dice.roll(10_000) <= threshold {
                        self.severity = (self.severity + 1).min(cfg.max_infection_severity);
                    }
                }
            }
        }

        self.severity = self.severity.max(0);
        effect.severity_change = self.severity - before;
        effect
    }

    /// Treat the condition, returning how much severity was removed
    pub fn apply_treatment(&mut self, quality: TreatmentQuality) -> i32 {
        let cfg = config();
        let effectiveness = quality.effectiveness();
        let scale = match self.kind {
            ConditionKind::Pain => effectiveness * cfg.pain_treatment_bonus,
            ConditionKind::Bleeding | ConditionKind::Infection { .. } => effectiveness,
        };
        let reduction = ((self.severity as f32 * scale) as i32).max(1);
        self.reduce(reduction);
        self.treated = true;
        reduction
    }

    /// Lower severity, never below zero
    pub fn reduce(&mut self, amount: i32) {
        self.severity = (self.severity - amount).max(0);
    }

    pub fn should_end(&self) -> bool {
        self.severity <= 0
    }

    pub fn set_environmental_risk(&mut self, modifier: f32) {
        if let ConditionKind::Infection { risk, .. } = &mut self.kind {
            *risk = modifier.max(config().min_infection_risk);
        }
    }

    pub fn to_record(&self) -> ConditionRecord {
        let (risk, baseline) = match self.kind {
            ConditionKind::Infection {
                risk,
                baseline_established,
            } => (Some(risk), Some(baseline_established)),
            _ => (None, None),
        };
        ConditionRecord {
            kind: self.kind.type_name().to_string(),
            severity: self.severity,
            max_severity: self.max_severity,
            location: self.location.clone(),
            treated: self.treated,
            environmental_risk: risk,
            baseline_established: baseline,
        }
    }

    pub fn from_record(record: &ConditionRecord) -> Result<Self> {
        let kind = match record.kind.as_str() {
            "bleeding" | "minor_bleeding" => ConditionKind::Bleeding,
            "pain" => ConditionKind::Pain,
            "infection" => ConditionKind::Infection {
                risk: record.environmental_risk.unwrap_or(1.0),
                baseline_established: record.baseline_established.unwrap_or(false),
            },
            other => {
                return Err(EngineError::InvalidRecord(format!("unknown condition type: {other}")));
            }
        };
        Ok(Self {
            kind,
            severity: record.severity,
            max_severity: record.max_severity,
            location: record.location.clone(),
            treated: record.treated,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (severity {})", self.kind.type_name(), self.severity)?;
        if let Some(location) = &self.location {
            write!(f, " on {location}")?;
        }
        if self.treated {
            write!(f, " [treated]")?;
        }
        Ok(())
    }
}

/// Persisted form of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: i32,
    pub max_severity: i32,
    pub location: Option<String>,
    pub treated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_risk: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_established: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;

    #[test]
    fn test_untreated_bleeding_loses_full_rate() {
        let mut bleed = Condition::bleeding(4, Some("chest"));
        // 100 never passes the 10% clotting check
        let mut dice = ScriptedDice::new([100]);
        let effect = bleed.tick(&mut dice);
        assert_eq!(effect.blood_loss, config().blood_loss_for(4));
        assert_eq!(bleed.severity, 4);
    }

    #[test]
    fn test_treated_bleeding_loses_reduced_rate_and_does_not_clot() {
        let mut bleed = Condition::bleeding(10, None);
        bleed.treated = true;
        let mut dice = ScriptedDice::new([1]);
        let effect = bleed.tick(&mut dice);
        // 10 * 0.3
        assert_eq!(effect.blood_loss, 3);
        assert_eq!(bleed.severity, 10);
        assert_eq!(dice.remaining(), 1);
    }

    #[test]
    fn test_pain_heals_on_low_roll() {
        let mut pain = Condition::pain(3, None);
        let mut dice = ScriptedDice::new([20, 21]);
        pain.tick(&mut dice);
        assert_eq!(pain.severity, 2);
        pain.tick(&mut dice);
        assert_eq!(pain.severity, 2);
    }

    #[test]
    fn test_infection_first_tick_is_baseline() {
        let mut infection = Condition::infection(2, Some("abdomen"));
        let mut dice = ScriptedDice::new([1]);
        infection.tick(&mut dice);
        assert_eq!(infection.severity, 2);
        // Nothing consumed on the baseline tick
        assert_eq!(dice.remaining(), 1);

        // 1 <= 100 (1% at risk 1.0) worsens
        infection.tick(&mut dice);
        assert_eq!(infection.severity, 3);
    }

    #[test]
    fn test_infection_progression_scales_with_risk() {
        let mut infection = Condition::infection(2, None);
        infection.set_environmental_risk(5.0);
        let mut dice = ScriptedDice::new([500, 501]);
        infection.tick(&mut dice);
        infection.tick(&mut dice);
        assert_eq!(infection.severity, 3);
        infection.tick(&mut dice);
        assert_eq!(infection.severity, 3);
    }

    #[test]
    fn test_infection_caps_at_max() {
        let mut infection = Condition::infection(10, None);
        let mut dice = ScriptedDice::new([1, 1, 1]);
        for _ in 0..3 {
            infection.tick(&mut dice);
        }
        assert_eq!(infection.severity, 10);
    }

    #[test]
    fn test_environmental_risk_has_floor() {
        let mut infection = Condition::infection(1, None);
        infection.set_environmental_risk(0.0);
        assert!(matches!(infection.kind, ConditionKind::Infection { risk, .. } if (risk - 0.1).abs() < 1e-6));
    }

    #[test]
    fn test_treatment_reduction() {
        let mut bleed = Condition::bleeding(8, None);
        assert_eq!(bleed.apply_treatment(TreatmentQuality::Adequate), 4);
        assert_eq!(bleed.severity, 4);
        assert!(bleed.treated);

        // Pain gets the painkiller bonus: 8 * 0.5 * 1.5
        let mut pain = Condition::pain(8, None);
        assert_eq!(pain.apply_treatment(TreatmentQuality::Adequate), 6);
        assert_eq!(pain.severity, 2);

        // Always at least one step
        let mut small = Condition::infection(1, None);
        assert_eq!(small.apply_treatment(TreatmentQuality::Poor), 1);
        assert!(small.should_end());
    }

    #[test]
    fn test_severity_floor_is_zero() {
        let mut pain = Condition::pain(1, None);
        pain.reduce(5);
        assert_eq!(pain.severity, 0);
        assert_eq!(pain.max_severity, 1);
        assert!(pain.should_end());
    }

    #[test]
    fn test_record_round_trip() {
        let mut infection = Condition::infection(3, Some("left_leg"));
        infection.set_environmental_risk(2.5);
        infection.treated = true;
        let record = infection.to_record();
        assert_eq!(record.kind, "infection");
        assert_eq!(Condition::from_record(&record).unwrap(), infection);
    }

    #[test]
    fn test_legacy_bleeding_name_accepted() {
        let record = ConditionRecord {
            kind: "minor_bleeding".into(),
            severity: 2,
            max_severity: 3,
            location: None,
            treated: false,
            environmental_risk: None,
            baseline_established: None,
        };
        let condition = Condition::from_record(&record).unwrap();
        assert_eq!(condition.kind, ConditionKind::Bleeding);
    }

    #[test]
    fn test_unknown_record_type_rejected() {
        let record = ConditionRecord {
            kind: "curse".into(),
            severity: 1,
            max_severity: 1,
            location: None,
            treated: false,
            environmental_risk: None,
            baseline_established: None,
        };
        assert!(Condition::from_record(&record).is_err());
    }
}
