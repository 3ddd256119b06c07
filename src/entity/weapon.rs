//! Wielded weapons

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::medical::damage::InjuryType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCategory {
    Unarmed,
    Blade,
    Blunt,
    Spear,
    Firearm,
    Bow,
}

impl WeaponCategory {
    /// Message catalog key
    pub fn key(self) -> &'static str {
        match self {
            WeaponCategory::Unarmed => "unarmed",
            WeaponCategory::Blade => "blade",
            WeaponCategory::Blunt => "blunt",
            WeaponCategory::Spear => "spear",
            WeaponCategory::Firearm => "firearm",
            WeaponCategory::Bow => "bow",
        }
    }

    pub fn injury_type(self) -> InjuryType {
        match self {
            WeaponCategory::Unarmed | WeaponCategory::Blunt => InjuryType::Blunt,
            WeaponCategory::Blade => InjuryType::Blade,
            WeaponCategory::Spear | WeaponCategory::Bow => InjuryType::Pierce,
            WeaponCategory::Firearm => InjuryType::Bullet,
        }
    }

    pub fn is_ranged(self) -> bool {
        matches!(self, WeaponCategory::Firearm | WeaponCategory::Bow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub category: WeaponCategory,
    pub damage: u32,
}

impl Weapon {
    pub fn new(name: &str, category: WeaponCategory, damage: u32) -> Self {
        Self {
            name: name.to_string(),
            category,
            damage,
        }
    }

    /// Bare hands
    pub fn fists() -> Self {
        Self::new("fists", WeaponCategory::Unarmed, config().unarmed_damage)
    }

    pub fn knife() -> Self {
        Self::new("knife", WeaponCategory::Blade, 6)
    }

    pub fn club() -> Self {
        Self::new("club", WeaponCategory::Blunt, 7)
    }

    pub fn pistol() -> Self {
        Self::new("pistol", WeaponCategory::Firearm, 12)
    }

    pub fn is_ranged(&self) -> bool {
        self.category.is_ranged()
    }
}
