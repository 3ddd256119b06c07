//! Characters: identity, stats, equipment, and their medical state

use crate::core::dice::Dice;
use crate::core::types::{CharacterId, LocationId};
use crate::entity::stats::{Stats, Statted};
use crate::entity::weapon::Weapon;
use crate::medical::anatomy::Anatomy;
use crate::medical::damage::{apply_anatomical_damage, DamageReport, InjuryType};
use crate::medical::state::MedicalState;

/// Placement marker shown while a character is fighting
pub const IN_COMBAT_PLACE: &str = "locked in combat.";

#[derive(Debug, Clone)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub location: LocationId,
    pub stats: Stats,
    pub wielded: Option<Weapon>,
    /// Custom placement text for room descriptions; empty when unset
    pub override_place: String,
    /// Body locations that can be struck
    pub body_locations: Vec<String>,
    pub medical: MedicalState,
}

impl Character {
    pub fn new(name: &str, location: LocationId) -> Self {
        Self::with_anatomy(name, location, &Anatomy::human())
    }

    pub fn with_anatomy(name: &str, location: LocationId, anatomy: &Anatomy) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.to_string(),
            location,
            stats: Stats::default(),
            wielded: None,
            override_place: String::new(),
            body_locations: anatomy.locations(),
            medical: MedicalState::new(anatomy),
        }
    }

    pub fn with_stats(mut self, motorics: i32, grit: i32, intellect: i32) -> Self {
        self.stats = Stats::new(motorics, grit, intellect);
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.wielded = Some(weapon);
        self
    }

    /// Test character: knife fighter with middling stats
    pub fn test_brawler(name: &str, location: LocationId) -> Self {
        Self::new(name, location).with_stats(5, 5, 3).with_weapon(Weapon::knife())
    }

    /// Test character: pistol shooter
    pub fn test_shooter(name: &str, location: LocationId) -> Self {
        Self::new(name, location).with_stats(6, 3, 3).with_weapon(Weapon::pistol())
    }

    /// Weapon in hand, or bare fists
    pub fn weapon(&self) -> Weapon {
        self.wielded.clone().unwrap_or_else(Weapon::fists)
    }

    pub fn has_ranged_weapon(&self) -> bool {
        self.wielded.as_ref().is_some_and(Weapon::is_ranged)
    }

    pub fn is_dead(&self) -> bool {
        self.medical.is_dead()
    }

    /// Alive and conscious
    pub fn can_act(&self) -> bool {
        self.medical.is_active()
    }

    /// Damage entry point for anything that hurts this character
    pub fn apply_anatomical_damage(
        &mut self,
        amount: u32,
        location: &str,
        injury_type: InjuryType,
        target_organ: Option<&str>,
        dice: &mut dyn Dice,
    ) -> DamageReport {
        apply_anatomical_damage(&mut self.medical, amount, location, injury_type, target_organ, dice)
    }
}

impl Statted for Character {
    fn stats(&self) -> &Stats {
        &self.stats
    }
}
