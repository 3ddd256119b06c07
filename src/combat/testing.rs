//! Shared fixture for combat unit tests

use crate::combat::aim::AimTable;
use crate::combat::context::CombatContext;
use crate::combat::messages::FallbackCatalog;
use crate::combat::proximity::ProximityGraph;
use crate::core::dice::ScriptedDice;
use crate::core::outbox::Outbox;
use crate::core::types::{CharacterId, LocationId};
use crate::entity::character::Character;
use crate::entity::world::{Location, World};

pub(crate) struct Harness {
    pub here: LocationId,
    pub world: World,
    pub proximity: ProximityGraph,
    pub aim: AimTable,
    pub dice: ScriptedDice,
    pub outbox: Outbox,
    pub catalog: FallbackCatalog,
}

impl Harness {
    pub fn new(rolls: &[u32]) -> Self {
        let here = LocationId(1);
        let mut world = World::new();
        world.add_location(Location::new(here, "Courtyard"));
        Self {
            here,
            world,
            proximity: ProximityGraph::new(),
            aim: AimTable::new(),
            dice: ScriptedDice::new(rolls.iter().copied()),
            outbox: Outbox::new(),
            catalog: FallbackCatalog,
        }
    }

    /// Spawn a character here with the given motor skill and minimal grit
    pub fn spawn(&mut self, name: &str, motorics: i32) -> CharacterId {
        self.world.spawn(Character::new(name, self.here).with_stats(motorics, 1, 1))
    }

    pub fn ctx(&mut self) -> CombatContext<'_> {
        CombatContext {
            world: &mut self.world,
            proximity: &mut self.proximity,
            aim: &mut self.aim,
            dice: &mut self.dice,
            outbox: &mut self.outbox,
            catalog: &self.catalog,
        }
    }
}
