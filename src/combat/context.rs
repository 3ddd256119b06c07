//! Borrowed view of everything a session needs to resolve actions

use crate::combat::aim::AimTable;
use crate::combat::messages::{CombatMessage, MessageCatalog};
use crate::combat::proximity::ProximityGraph;
use crate::core::dice::Dice;
use crate::core::outbox::Outbox;
use crate::core::types::{CharacterId, LocationId};
use crate::entity::world::World;

/// Mutable access to the world and engine-wide tables during resolution
pub struct CombatContext<'a> {
    pub world: &'a mut World,
    pub proximity: &'a mut ProximityGraph,
    pub aim: &'a mut AimTable,
    pub dice: &'a mut dyn Dice,
    pub outbox: &'a mut Outbox,
    pub catalog: &'a dyn MessageCatalog,
}

impl CombatContext<'_> {
    pub fn name(&self, id: CharacterId) -> String {
        self.world.name_of(id)
    }

    pub fn msg(&mut self, to: CharacterId, text: impl Into<String>) {
        self.outbox.msg(to, text);
    }

    pub fn msg_location(&mut self, location: LocationId, text: impl Into<String>, exclude: &[CharacterId]) {
        self.outbox.msg_location(location, text, exclude);
    }

    /// Deliver a three-perspective message to actor, victim, and the room
    pub fn announce(&mut self, actor: CharacterId, victim: CharacterId, message: CombatMessage) {
        let location = self.world.location_of(actor);
        self.outbox.msg(actor, message.attacker);
        self.outbox.msg(victim, message.victim);
        if let Some(location) = location {
            self.outbox.msg_location(location, message.observer, &[actor, victim]);
        }
    }

    /// Same as `announce` with plain strings
    pub fn announce_text(&mut self, actor: CharacterId, victim: CharacterId, to_actor: String, to_victim: String, to_room: String) {
        self.announce(
            actor,
            victim,
            CombatMessage {
                attacker: to_actor,
                victim: to_victim,
                observer: to_room,
            },
        );
    }
}
