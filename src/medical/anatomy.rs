//! Static anatomy tables: body locations, the organs they contain, and
//! rarity-weighted hit weights.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rarity category controlling how often an organ is struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitWeight {
    Common,
    Uncommon,
    Rare,
    VeryRare,
}

impl HitWeight {
    pub fn value(self) -> u32 {
        match self {
            HitWeight::Common => 60,
            HitWeight::Uncommon => 30,
            HitWeight::Rare => 10,
            HitWeight::VeryRare => 3,
        }
    }

    /// Weight multiplier applied at a given precision total.
    ///
    /// Precise attackers go for rare organs and deliberately avoid easy ones.
    pub fn precision_modifier(self, precision: u32) -> f32 {
        match self {
            HitWeight::VeryRare => {
                if precision >= 25 {
                    3.0
                } else if precision >= 20 {
                    2.0
                } else {
                    0.5
                }
            }
            HitWeight::Rare => {
                if precision >= 20 {
                    2.0
                } else if precision >= 15 {
                    1.5
                } else {
                    1.0
                }
            }
            HitWeight::Common | HitWeight::Uncommon => {
                if precision >= 20 {
                    0.7
                } else {
                    1.0
                }
            }
        }
    }
}

/// Body functions derived from organ health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    Consciousness,
    Sight,
    Breathing,
    BloodPumping,
    BloodFiltration,
    Digestion,
    Moving,
    Manipulation,
    Talking,
}

impl Capacity {
    pub const ALL: [Capacity; 9] = [
        Capacity::Consciousness,
        Capacity::Sight,
        Capacity::Breathing,
        Capacity::BloodPumping,
        Capacity::BloodFiltration,
        Capacity::Digestion,
        Capacity::Moving,
        Capacity::Manipulation,
        Capacity::Talking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capacity::Consciousness => "consciousness",
            Capacity::Sight => "sight",
            Capacity::Breathing => "breathing",
            Capacity::BloodPumping => "blood_pumping",
            Capacity::BloodFiltration => "blood_filtration",
            Capacity::Digestion => "digestion",
            Capacity::Moving => "moving",
            Capacity::Manipulation => "manipulation",
            Capacity::Talking => "talking",
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capacity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capacity::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown capacity: {s}"))
    }
}

/// Locations where extra hit margin pushes strikes
pub const VITAL_LOCATIONS: [&str; 4] = ["head", "chest", "neck", "abdomen"];

/// Location used when a character has no anatomy at all
pub const FALLBACK_LOCATION: &str = "chest";

pub fn is_vital_location(location: &str) -> bool {
    VITAL_LOCATIONS.contains(&location)
}

/// Definition of one organ in an anatomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganDef {
    pub name: String,
    /// Body location containing the organ
    pub container: String,
    pub max_hp: u32,
    pub hit_weight: HitWeight,
    pub capacity: Option<Capacity>,
}

impl OrganDef {
    pub fn new(name: &str, container: &str, max_hp: u32, hit_weight: HitWeight, capacity: Option<Capacity>) -> Self {
        Self {
            name: name.to_string(),
            container: container.to_string(),
            max_hp,
            hit_weight,
            capacity,
        }
    }
}

/// An ordered set of organ definitions
///
/// Order matters: damage remainders go to the last organ of a location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anatomy {
    pub organs: Vec<OrganDef>,
}

impl Anatomy {
    pub fn new(organs: Vec<OrganDef>) -> Self {
        Self { organs }
    }

    /// Standard human body
    pub fn human() -> Self {
        use Capacity::*;
        use HitWeight::*;

        let mut organs = vec![
            OrganDef::new("brain", "head", 10, Rare, Some(Consciousness)),
            OrganDef::new("left_eye", "head", 5, VeryRare, Some(Sight)),
            OrganDef::new("right_eye", "head", 5, VeryRare, Some(Sight)),
            OrganDef::new("jaw", "head", 15, Common, Some(Talking)),
            OrganDef::new("trachea", "neck", 8, Uncommon, Some(Breathing)),
            OrganDef::new("cervical_spine", "neck", 12, Rare, Some(Moving)),
            OrganDef::new("heart", "chest", 15, Rare, Some(BloodPumping)),
            OrganDef::new("left_lung", "chest", 20, Common, Some(Breathing)),
            OrganDef::new("right_lung", "chest", 20, Common, Some(Breathing)),
            OrganDef::new("liver", "abdomen", 20, Uncommon, Some(BloodFiltration)),
            OrganDef::new("stomach", "abdomen", 15, Common, Some(Digestion)),
            OrganDef::new("left_kidney", "abdomen", 12, Uncommon, Some(BloodFiltration)),
            OrganDef::new("right_kidney", "abdomen", 12, Uncommon, Some(BloodFiltration)),
        ];

        for side in ["left", "right"] {
            organs.push(OrganDef::new(&format!("{side}_humerus"), &format!("{side}_arm"), 25, Common, Some(Manipulation)));
            organs.push(OrganDef::new(&format!("{side}_metacarpals"), &format!("{side}_hand"), 15, Common, Some(Manipulation)));
            organs.push(OrganDef::new(&format!("{side}_femur"), &format!("{side}_leg"), 30, Common, Some(Moving)));
            organs.push(OrganDef::new(&format!("{side}_metatarsals"), &format!("{side}_foot"), 15, Common, Some(Moving)));
        }

        Self { organs }
    }

    /// Body locations in first-seen order
    pub fn locations(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for organ in &self.organs {
            if !seen.contains(&organ.container) {
                seen.push(organ.container.clone());
            }
        }
        seen
    }
}
