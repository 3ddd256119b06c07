//! Per-combatant record within a combat session

use serde::{Deserialize, Serialize};

use crate::core::types::CharacterId;

/// Action queued for a combatant's next turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatAction {
    /// Nothing queued: fall back to the default behavior for the turn
    #[default]
    None,
    Attack,
    GrappleInitiate,
    /// Contest the current grappler of someone already held
    GrappleJoin,
    /// Wrestle someone who is holding a victim
    GrappleTakeover,
    Escape,
    Release,
    Disarm,
}

/// Initial grapple links for a character joining a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinState {
    pub grappling: Option<CharacterId>,
    pub grappled_by: Option<CharacterId>,
    pub is_yielding: bool,
}

/// One character's state within a session.
///
/// Entries are only mutated through [`CombatSession`](crate::combat::CombatSession)
/// so grapple cross-references stay symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantEntry {
    pub character: CharacterId,
    pub initiative: u32,
    pub target: Option<CharacterId>,
    pub grappling: Option<CharacterId>,
    pub grappled_by: Option<CharacterId>,
    pub is_yielding: bool,
    pub action: CombatAction,
    pub action_target: Option<CharacterId>,
    /// Joined the fight through the action now queued
    #[serde(default)]
    pub initiated_combat_this_action: bool,
    /// Join order, breaks initiative ties
    #[serde(default)]
    pub joined_seq: u64,
}

impl CombatantEntry {
    pub fn new(character: CharacterId, initiative: u32, joined_seq: u64) -> Self {
        Self {
            character,
            initiative,
            target: None,
            grappling: None,
            grappled_by: None,
            is_yielding: false,
            action: CombatAction::None,
            action_target: None,
            initiated_combat_this_action: false,
            joined_seq,
        }
    }

    pub fn is_grappling(&self) -> bool {
        self.grappling.is_some()
    }

    pub fn is_grappled(&self) -> bool {
        self.grappled_by.is_some()
    }

    /// Take the queued action, leaving the slot empty
    pub fn take_action(&mut self) -> (CombatAction, Option<CharacterId>) {
        let action = std::mem::take(&mut self.action);
        (action, self.action_target.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_action_clears_slot() {
        let mut entry = CombatantEntry::new(CharacterId::new(), 12, 0);
        let target = CharacterId::new();
        entry.action = CombatAction::Disarm;
        entry.action_target = Some(target);

        assert_eq!(entry.take_action(), (CombatAction::Disarm, Some(target)));
        assert_eq!(entry.action, CombatAction::None);
        assert_eq!(entry.action_target, None);
    }

    #[test]
    fn test_entry_serializes_as_plain_mapping() {
        let mut entry = CombatantEntry::new(CharacterId::new(), 17, 3);
        entry.is_yielding = true;
        entry.action = CombatAction::GrappleJoin;

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["initiative"], 17);
        assert_eq!(value["is_yielding"], true);
        assert_eq!(value["action"], "grapple_join");
        assert!(value["grappling"].is_null());

        let back: CombatantEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
