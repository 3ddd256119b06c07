//! Individual organ health

use serde::{Deserialize, Serialize};

use crate::medical::anatomy::{Capacity, HitWeight, OrganDef};

/// A single organ with clamped hit points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organ {
    pub name: String,
    pub container: String,
    current_hp: u32,
    max_hp: u32,
    pub hit_weight: HitWeight,
    pub capacity: Option<Capacity>,
}

impl Organ {
    pub fn from_def(def: &OrganDef) -> Self {
        Self {
            name: def.name.clone(),
            container: def.container.clone(),
            current_hp: def.max_hp,
            max_hp: def.max_hp,
            hit_weight: def.hit_weight,
            capacity: def.capacity,
        }
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Set HP, clamped to [0, max]
    pub fn set_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }

    /// Apply damage, returning true if this blow destroyed the organ
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_functional = self.is_functional();
        self.current_hp = self.current_hp.saturating_sub(amount);
        was_functional && self.is_destroyed()
    }

    /// Restore HP up to max
    pub fn heal(&mut self, amount: u32) {
        self.set_hp(self.current_hp.saturating_add(amount));
    }

    pub fn is_destroyed(&self) -> bool {
        self.current_hp == 0
    }

    pub fn is_functional(&self) -> bool {
        !self.is_destroyed()
    }

    /// Fraction of full function, 0.0..=1.0
    pub fn functionality(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.max_hp as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heart() -> Organ {
        Organ::from_def(&OrganDef::new("heart", "chest", 15, HitWeight::Rare, Some(Capacity::BloodPumping)))
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut organ = heart();
        assert!(!organ.take_damage(10));
        assert_eq!(organ.current_hp(), 5);
        assert!(organ.take_damage(50));
        assert_eq!(organ.current_hp(), 0);
        // Already destroyed: no second destruction event
        assert!(!organ.take_damage(5));
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut organ = heart();
        organ.take_damage(5);
        organ.heal(100);
        assert_eq!(organ.current_hp(), organ.max_hp());
    }

    #[test]
    fn test_functionality() {
        let mut organ = heart();
        organ.set_hp(3);
        assert!((organ.functionality() - 0.2).abs() < 1e-6);
    }
}
