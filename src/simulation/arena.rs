//! Arena - owns the world and every active combat session
//!
//! Ties the pieces together:
//! commands queue actions -> combat rounds resolve them -> medical ticks
//! progress conditions -> the game layer drains the outbox.
//!
//! Sessions are keyed by location and exist only while they have combatants.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::aim::AimTable;
use crate::combat::context::CombatContext;
use crate::combat::entry::JoinState;
use crate::combat::messages::{CombatMessage, FallbackCatalog, MessageCatalog};
use crate::combat::proximity::ProximityGraph;
use crate::combat::session::{CombatSession, RoundReport, SessionSnapshot};
use crate::core::config::config;
use crate::core::dice::{Dice, SeededDice};
use crate::core::error::Result;
use crate::core::outbox::{Message, Outbox};
use crate::core::scheduler::{ScheduledTick, TickScheduler};
use crate::core::types::{CharacterId, LocationId};
use crate::entity::character::Character;
use crate::entity::world::{Location, World};
use crate::medical::ticker::{tick_conditions, TickReport};

/// Everything that happened during one call to [`Arena::advance`]
#[derive(Debug, Clone, Default)]
pub struct AdvanceReport {
    pub rounds: Vec<RoundReport>,
    pub medical: Vec<(CharacterId, TickReport)>,
}

pub struct Arena<D: Dice = SeededDice> {
    pub(crate) world: World,
    pub(crate) proximity: ProximityGraph,
    pub(crate) aim: AimTable,
    pub(crate) sessions: AHashMap<LocationId, CombatSession>,
    pub(crate) dice: D,
    pub(crate) outbox: Outbox,
    pub(crate) catalog: Box<dyn MessageCatalog>,
    scheduler: TickScheduler,
}

impl Arena<SeededDice> {
    /// Arena with seeded dice for reproducible runs
    pub fn new(seed: u64) -> Self {
        Self::with_dice(SeededDice::new(seed))
    }
}

impl<D: Dice> Arena<D> {
    pub fn with_dice(dice: D) -> Self {
        Self {
            world: World::new(),
            proximity: ProximityGraph::new(),
            aim: AimTable::new(),
            sessions: AHashMap::new(),
            dice,
            outbox: Outbox::new(),
            catalog: Box::new(FallbackCatalog),
            scheduler: TickScheduler::from_config(config()),
        }
    }

    /// Replace the flavor-text catalog
    pub fn with_catalog(mut self, catalog: Box<dyn MessageCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn add_location(&mut self, location: Location) {
        self.world.add_location(location);
    }

    pub fn spawn(&mut self, character: Character) -> CharacterId {
        self.world.spawn(character)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn proximity(&self) -> &ProximityGraph {
        &self.proximity
    }

    pub fn aim_table(&self) -> &AimTable {
        &self.aim
    }

    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Take every queued message for delivery
    pub fn drain_messages(&mut self) -> Vec<Message> {
        self.outbox.drain()
    }

    /// Split into the session map and a context over everything else
    pub(crate) fn split(&mut self) -> (&mut AHashMap<LocationId, CombatSession>, CombatContext<'_>) {
        let ctx = CombatContext {
            world: &mut self.world,
            proximity: &mut self.proximity,
            aim: &mut self.aim,
            dice: &mut self.dice,
            outbox: &mut self.outbox,
            catalog: self.catalog.as_ref(),
        };
        (&mut self.sessions, ctx)
    }

    /// Deliver a three-perspective combat message
    pub(crate) fn announce(&mut self, actor: CharacterId, victim: CharacterId, message: CombatMessage) {
        let (_, mut ctx) = self.split();
        ctx.announce(actor, victim, message);
    }

    // === SESSION REGISTRY ===

    pub fn session(&self, location: LocationId) -> Option<&CombatSession> {
        self.sessions.get(&location)
    }

    /// The session the character is fighting in, if any
    pub fn session_of(&self, character: CharacterId) -> Option<&CombatSession> {
        let location = self.world.location_of(character)?;
        self.sessions.get(&location).filter(|s| s.contains(character))
    }

    pub fn in_combat(&self, character: CharacterId) -> bool {
        self.session_of(character).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The location's session, creating an empty one if there is none
    pub fn get_or_create_combat(&mut self, location: LocationId) -> &mut CombatSession {
        self.sessions.entry(location).or_insert_with(|| {
            tracing::debug!(%location, "combat session created");
            CombatSession::new(location)
        })
    }

    /// Put a character into the fight at their current location
    pub fn add_to_combat(&mut self, character: CharacterId, target: Option<CharacterId>, join: JoinState) -> bool {
        let Some(location) = self.world.location_of(character) else {
            tracing::warn!(%character, "cannot add unknown character to combat");
            return false;
        };
        let (sessions, mut ctx) = self.split();
        let session = sessions.entry(location).or_insert_with(|| CombatSession::new(location));
        let added = session.add_combatant(&mut ctx, character, target, join);
        self.prune_sessions();
        added
    }

    /// Take a character out of whatever fight they are in
    pub fn remove_from_combat(&mut self, character: CharacterId) -> bool {
        let Some(location) = self.session_of(character).map(CombatSession::location) else {
            return false;
        };
        let (sessions, mut ctx) = self.split();
        let removed = sessions
            .get_mut(&location)
            .is_some_and(|session| session.remove_combatant(&mut ctx, character));
        self.prune_sessions();
        removed
    }

    /// Take a group out of their fight in one step, without telling them
    /// about each other leaving
    pub(crate) fn transfer_out_of_combat(&mut self, location: LocationId, departing: &[CharacterId]) -> usize {
        let (sessions, mut ctx) = self.split();
        let removed = sessions
            .get_mut(&location)
            .map_or(0, |session| session.transfer_out(&mut ctx, departing));
        self.prune_sessions();
        removed
    }

    /// Destroy sessions whose roster has emptied
    fn prune_sessions(&mut self) {
        self.sessions.retain(|location, session| {
            let keep = !session.is_empty();
            if !keep {
                tracing::debug!(%location, "combat session destroyed");
            }
            keep
        });
    }

    // === TICKS ===

    /// Resolve one round in every active session, in location order
    pub fn run_combat_round(&mut self) -> Vec<RoundReport> {
        let mut locations: Vec<LocationId> = self.sessions.keys().copied().collect();
        locations.sort();

        let mut reports = Vec::with_capacity(locations.len());
        {
            let (sessions, mut ctx) = self.split();
            for location in locations {
                if let Some(session) = sessions.get_mut(&location) {
                    reports.push(session.resolve_round(&mut ctx));
                }
            }
        }
        self.prune_sessions();
        reports
    }

    /// Tick every living character's conditions.
    ///
    /// Infection risk follows the character's current location. Anyone who
    /// dies is taken out of combat.
    pub fn tick_conditions(&mut self) -> Vec<(CharacterId, TickReport)> {
        let mut reports = Vec::new();
        let mut deaths = Vec::new();

        for id in self.world.character_ids() {
            let Some(location) = self.world.location_of(id) else { continue };
            let risk = self.world.infection_risk(location);
            let Some(character) = self.world.get_mut(id) else { continue };
            if character.is_dead() || !character.medical.has_active_conditions() {
                continue;
            }

            character.medical.set_infection_risk(risk);
            let report = tick_conditions(&mut character.medical, &mut self.dice);
            let name = character.name.clone();

            if report.died {
                tracing::info!(character = %id, "died from their injuries");
                self.outbox.msg(id, "Your injuries finally overwhelm you. Everything goes dark.");
                self.outbox.msg_location(location, format!("{name} collapses and goes still."), &[id]);
                deaths.push(id);
            } else if report.fell_unconscious {
                self.outbox.msg(id, "You slip into unconsciousness.");
                self.outbox.msg_location(location, format!("{name} slumps over, unconscious."), &[id]);
            }
            reports.push((id, report));
        }

        for id in deaths {
            self.remove_from_combat(id);
        }
        reports
    }

    /// Move the clock forward, running every round and medical tick that
    /// comes due
    pub fn advance(&mut self, seconds: u64) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        for tick in self.scheduler.advance(seconds) {
            match tick {
                ScheduledTick::CombatRound => report.rounds.extend(self.run_combat_round()),
                ScheduledTick::MedicalTick => report.medical.extend(self.tick_conditions()),
            }
        }
        report
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.scheduler.now()
    }

    // === PERSISTENCE ===

    /// Snapshot of every active session
    pub fn combat_snapshot(&self) -> CombatSnapshot {
        let mut sessions: Vec<SessionSnapshot> = self.sessions.values().map(CombatSession::snapshot).collect();
        sessions.sort_by_key(|s| s.location);
        CombatSnapshot { sessions }
    }

    /// Replace all sessions from a snapshot.
    ///
    /// Links to characters that no longer exist are repaired and grapple
    /// partners are put back in melee range.
    pub fn restore_combat(&mut self, snapshot: CombatSnapshot) {
        self.sessions.clear();
        for saved in snapshot.sessions {
            let session = CombatSession::restore(saved, &self.world);
            if session.is_empty() {
                continue;
            }
            for entry in session.entries() {
                if let Some(victim) = entry.grappling {
                    self.proximity.establish(entry.character, victim);
                }
            }
            self.sessions.insert(session.location(), session);
        }
        tracing::info!(sessions = self.sessions.len(), "combat state restored");
    }
}

/// Persisted combat state across all locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub sessions: Vec<SessionSnapshot>,
}

impl CombatSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::medical::condition::Condition;

    fn arena() -> (Arena<ScriptedDice>, LocationId) {
        let mut arena = Arena::with_dice(ScriptedDice::default());
        let here = LocationId(1);
        arena.add_location(Location::new(here, "Alley"));
        (arena, here)
    }

    #[test]
    fn test_session_created_on_demand_and_pruned() {
        let (mut arena, here) = arena();
        let a = arena.spawn(Character::test_brawler("Ash", here));

        assert!(arena.add_to_combat(a, None, JoinState::default()));
        assert_eq!(arena.session_count(), 1);
        assert!(arena.in_combat(a));

        assert!(arena.remove_from_combat(a));
        assert_eq!(arena.session_count(), 0);
        assert!(!arena.remove_from_combat(a));
    }

    #[test]
    fn test_round_removes_orphans_and_prunes() {
        let (mut arena, here) = arena();
        let a = arena.spawn(Character::test_brawler("Ash", here));
        arena.add_to_combat(a, None, JoinState::default());

        let reports = arena.run_combat_round();

        assert_eq!(reports[0].orphans, vec![a]);
        assert_eq!(arena.session_count(), 0);
    }

    #[test]
    fn test_medical_tick_uses_location_risk() {
        let mut arena = Arena::with_dice(ScriptedDice::default());
        let ward = LocationId(7);
        arena.add_location(Location::new(ward, "Filthy ward").with_infection_risk(3.0));
        let a = arena.spawn(Character::test_brawler("Ash", ward));
        arena
            .world_mut()
            .get_mut(a)
            .unwrap()
            .medical
            .add_condition(Condition::bleeding(2, Some("chest")));

        let reports = arena.tick_conditions();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].1.blood_lost, 1);
    }

    #[test]
    fn test_advance_runs_due_ticks() {
        let (mut arena, here) = arena();
        let a = arena.spawn(Character::test_brawler("Ash", here));
        arena.add_to_combat(a, None, JoinState::default());

        let report = arena.advance(5);
        assert!(report.rounds.is_empty());

        let report = arena.advance(1);
        assert_eq!(report.rounds.len(), 1);
        assert_eq!(arena.elapsed_seconds(), 6);
    }

    #[test]
    fn test_combat_snapshot_round_trip() {
        let (mut arena, here) = arena();
        let a = arena.spawn(Character::test_brawler("Ash", here));
        let b = arena.spawn(Character::test_brawler("Bo", here));
        arena.add_to_combat(a, Some(b), JoinState::default());
        arena.add_to_combat(b, Some(a), JoinState::default());

        let json = arena.combat_snapshot().to_json().unwrap();
        arena.restore_combat(CombatSnapshot::from_json(&json).unwrap());

        let session = arena.session(here).unwrap();
        assert_eq!(session.target_id(a), Some(b));
        assert_eq!(session.target_id(b), Some(a));
    }
}
