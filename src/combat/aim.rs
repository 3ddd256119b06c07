//! Aiming state, kept outside the character so it can be cleared wholesale

use ahash::AHashMap;

use crate::core::types::CharacterId;

/// What a character is aiming at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AimTarget {
    Character(CharacterId),
    /// An exit or compass direction
    Direction(String),
}

/// Placement marker while aiming at someone
pub const AIMING_PLACE_PREFIX: &str = "aiming carefully at";
/// Placement marker when two characters aim at each other
pub const SHOWDOWN_PLACE: &str = "locked in a deadly showdown.";

#[derive(Debug, Default, Clone)]
pub struct AimTable {
    aiming: AHashMap<CharacterId, AimTarget>,
}

impl AimTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start aiming, replacing any previous aim. Returns the replaced target.
    pub fn aim(&mut self, aimer: CharacterId, target: AimTarget) -> Option<AimTarget> {
        self.aiming.insert(aimer, target)
    }

    pub fn stop(&mut self, aimer: CharacterId) -> Option<AimTarget> {
        self.aiming.remove(&aimer)
    }

    pub fn target_of(&self, aimer: CharacterId) -> Option<&AimTarget> {
        self.aiming.get(&aimer)
    }

    /// Everyone currently aiming at a character, in a stable order
    pub fn aimed_at_by(&self, target: CharacterId) -> Vec<CharacterId> {
        let mut out: Vec<CharacterId> = self
            .aiming
            .iter()
            .filter(|(_, aim)| **aim == AimTarget::Character(target))
            .map(|(aimer, _)| *aimer)
            .collect();
        out.sort();
        out
    }

    pub fn is_mutual(&self, a: CharacterId, b: CharacterId) -> bool {
        self.aiming.get(&a) == Some(&AimTarget::Character(b)) && self.aiming.get(&b) == Some(&AimTarget::Character(a))
    }

    /// Forget a character's own aim and every aim at them.
    ///
    /// Returns the characters who lost their target.
    pub fn clear(&mut self, character: CharacterId) -> Vec<CharacterId> {
        self.aiming.remove(&character);
        let aimers = self.aimed_at_by(character);
        for aimer in &aimers {
            self.aiming.remove(aimer);
        }
        aimers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aimed_at_by_and_mutual() {
        let mut table = AimTable::new();
        let a = CharacterId::new();
        let b = CharacterId::new();

        table.aim(a, AimTarget::Character(b));
        assert_eq!(table.aimed_at_by(b), vec![a]);
        assert!(!table.is_mutual(a, b));

        table.aim(b, AimTarget::Character(a));
        assert!(table.is_mutual(a, b));
    }

    #[test]
    fn test_clear_drops_incoming_aims() {
        let mut table = AimTable::new();
        let a = CharacterId::new();
        let b = CharacterId::new();
        table.aim(a, AimTarget::Character(b));
        table.aim(b, AimTarget::Direction("north".into()));

        assert_eq!(table.clear(b), vec![a]);
        assert!(table.target_of(a).is_none());
        assert!(table.target_of(b).is_none());
    }
}
