//! One location's fight: roster, turn order, and round resolution
//!
//! The session's roster is the single source of truth for targets and grapple
//! links among its members. Anything outside goes through the accessors here.

use serde::{Deserialize, Serialize};

use crate::combat::actions::{resolve_attack, resolve_disarm};
use crate::combat::context::CombatContext;
use crate::combat::entry::{CombatAction, CombatantEntry, JoinState};
use crate::combat::error::ActionError;
use crate::combat::grapple;
use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{CharacterId, LocationId, Round};
use crate::entity::character::{Character, IN_COMBAT_PLACE};
use crate::entity::stats::Statted;
use crate::entity::world::World;

/// What happened during one round
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundReport {
    pub round: Round,
    /// Combatants who took a turn, in resolution order
    pub acted: Vec<CharacterId>,
    /// Actions that were dropped, with the reason given to the actor
    pub failed: Vec<(CharacterId, ActionError)>,
    /// Removed for dying or vanishing mid-round
    pub fallen: Vec<CharacterId>,
    /// Removed by orphan detection
    pub orphans: Vec<CharacterId>,
    /// Grapple links repaired by the end-of-round validation
    pub repairs: usize,
}

#[derive(Debug, Clone)]
pub struct CombatSession {
    location: LocationId,
    entries: Vec<CombatantEntry>,
    active: bool,
    round: Round,
    next_seq: u64,
}

impl CombatSession {
    pub fn new(location: LocationId) -> Self {
        Self {
            location,
            entries: Vec::new(),
            active: false,
            round: 0,
            next_seq: 0,
        }
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start the round loop (no-op if already running)
    pub fn start(&mut self) {
        if !self.active {
            self.active = true;
            tracing::info!(location = %self.location, "combat started");
        }
    }

    pub fn stop(&mut self) {
        if self.active {
            self.active = false;
            tracing::info!(location = %self.location, rounds = self.round, "combat ended");
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, character: CharacterId) -> bool {
        self.entries.iter().any(|e| e.character == character)
    }

    pub fn entry(&self, character: CharacterId) -> Option<&CombatantEntry> {
        self.entries.iter().find(|e| e.character == character)
    }

    pub fn entries(&self) -> &[CombatantEntry] {
        &self.entries
    }

    pub(crate) fn entry_mut(&mut self, character: CharacterId) -> Option<&mut CombatantEntry> {
        self.entries.iter_mut().find(|e| e.character == character)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [CombatantEntry] {
        &mut self.entries
    }

    pub fn members(&self) -> Vec<CharacterId> {
        self.entries.iter().map(|e| e.character).collect()
    }

    /// Combatants currently targeting `character`
    pub fn attackers_of(&self, character: CharacterId) -> Vec<CharacterId> {
        self.entries
            .iter()
            .filter(|e| e.target == Some(character) && e.character != character)
            .map(|e| e.character)
            .collect()
    }

    // === ROSTER ===

    /// Add a character to the fight.
    ///
    /// Self-targets are dropped, duplicates are ignored. Initiative is rolled
    /// here and kept until the character is re-added.
    pub fn add_combatant(
        &mut self,
        ctx: &mut CombatContext<'_>,
        character: CharacterId,
        target: Option<CharacterId>,
        join: JoinState,
    ) -> bool {
        let Some(motorics) = ctx.world.get(character).map(|c| c.motorics()) else {
            tracing::warn!(%character, "cannot add unknown character to combat");
            return false;
        };
        if self.contains(character) {
            tracing::debug!(%character, "already in combat");
            return false;
        }

        let target = match target {
            Some(t) if t == character => {
                tracing::warn!(%character, "self-target cleared on joining combat");
                None
            }
            other => other,
        };

        let initiative = ctx.dice.roll(config().initiative_die) + motorics;
        let mut entry = CombatantEntry::new(character, initiative, self.next_seq);
        self.next_seq += 1;
        entry.target = target;
        entry.grappling = join.grappling.filter(|g| *g != character);
        entry.grappled_by = join.grappled_by.filter(|g| *g != character);
        entry.is_yielding = join.is_yielding;

        if let Some(ch) = ctx.world.get_mut(character) {
            if ch.override_place.is_empty() {
                ch.override_place = IN_COMBAT_PLACE.to_string();
            }
        }

        for partner in [entry.grappling, entry.grappled_by].into_iter().flatten() {
            ctx.proximity.establish(character, partner);
        }

        tracing::debug!(%character, initiative, target = ?target, location = %self.location, "joined combat");
        self.entries.push(entry);
        self.start();
        grapple::validate_and_cleanup(self, ctx.world);
        true
    }

    /// Take a character out of the fight and tear down everything tied to them.
    ///
    /// Anyone who was targeting them gets a new target if a fair one exists.
    /// Removing someone who is not here does nothing.
    pub fn remove_combatant(&mut self, ctx: &mut CombatContext<'_>, character: CharacterId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.character == character) else {
            return false;
        };
        let entry = self.entries.remove(index);

        self.cleanup_combatant_state(ctx, &entry, &[]);
        self.retarget_attackers_of(ctx, character);

        tracing::info!(%character, location = %self.location, remaining = self.entries.len(), "left combat");

        if self.entries.is_empty() {
            self.stop();
        }
        true
    }

    /// Take several characters out together, as when a grappler drags their
    /// victim away. Partners leaving together are not told about each other;
    /// everyone left behind is handled as for [`Self::remove_combatant`].
    pub(crate) fn transfer_out(&mut self, ctx: &mut CombatContext<'_>, departing: &[CharacterId]) -> usize {
        let (leaving, staying): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| departing.contains(&e.character));
        self.entries = staying;

        for entry in &leaving {
            self.cleanup_combatant_state(ctx, entry, departing);
        }
        for entry in &leaving {
            self.retarget_attackers_of(ctx, entry.character);
        }

        tracing::info!(location = %self.location, left = leaving.len(), remaining = self.entries.len(), "left combat together");
        if self.entries.is_empty() {
            self.stop();
        }
        leaving.len()
    }

    /// `quiet` lists grapple partners who get no release message
    fn cleanup_combatant_state(&mut self, ctx: &mut CombatContext<'_>, entry: &CombatantEntry, quiet: &[CharacterId]) {
        let me = entry.character;
        let name = ctx.name(me);

        if let Some(victim) = entry.grappling.filter(|v| !quiet.contains(v)) {
            ctx.msg(victim, format!("{name} releases their hold on you."));
        }
        if let Some(grappler) = entry.grappled_by.filter(|g| !quiet.contains(g)) {
            ctx.msg(grappler, format!("You lose your hold on {name}."));
        }
        for other in &mut self.entries {
            if other.grappling == Some(me) {
                other.grappling = None;
            }
            if other.grappled_by == Some(me) {
                other.grappled_by = None;
            }
            if other.action_target == Some(me) {
                other.action = CombatAction::None;
                other.action_target = None;
            }
        }

        ctx.proximity.clear(me);
        ctx.aim.stop(me);

        if let Some(ch) = ctx.world.get_mut(me) {
            if ch.override_place == IN_COMBAT_PLACE {
                ch.override_place.clear();
            }
        }
    }

    fn retarget_attackers_of(&mut self, ctx: &mut CombatContext<'_>, removed: CharacterId) {
        let removed_name = ctx.name(removed);

        for attacker in self.attackers_of(removed) {
            if let Some(entry) = self.entry_mut(attacker) {
                entry.target = None;
            }

            match self.find_replacement_target(ctx, attacker) {
                Some(new_target) => {
                    if let Some(entry) = self.entry_mut(attacker) {
                        entry.target = Some(new_target);
                        entry.action = CombatAction::None;
                        entry.action_target = None;
                        entry.is_yielding = false;
                    }
                    let attacker_name = ctx.name(attacker);
                    let target_name = ctx.name(new_target);
                    tracing::debug!(%attacker, %new_target, "auto-retargeted");
                    ctx.msg(attacker, format!("With {removed_name} gone, you turn your attention to {target_name}."));
                    ctx.msg(new_target, format!("{attacker_name} turns their attention to you."));
                }
                None => {
                    ctx.msg(
                        attacker,
                        format!("Your target {removed_name} has left combat. Choose a new target if you wish to continue fighting."),
                    );
                }
            }
        }
    }

    /// Pick someone who is already fighting `attacker`.
    ///
    /// Only characters actively targeting the attacker qualify, so neutral
    /// bystanders are never dragged in. Whoever is in reach comes first.
    fn find_replacement_target(&self, ctx: &CombatContext<'_>, attacker: CharacterId) -> Option<CharacterId> {
        let candidates: Vec<CharacterId> = self
            .entries
            .iter()
            .filter(|e| e.character != attacker && e.target == Some(attacker))
            .filter(|e| ctx.world.get(e.character).is_some_and(Character::can_act))
            .map(|e| e.character)
            .collect();

        if let Some(in_reach) = candidates.iter().copied().find(|c| ctx.proximity.is_in_proximity(attacker, *c)) {
            return Some(in_reach);
        }
        candidates.first().copied()
    }

    // === ACCESSORS ===

    pub fn set_target(&mut self, character: CharacterId, target: Option<CharacterId>) -> bool {
        if target == Some(character) {
            tracing::warn!(%character, "refusing self-target");
            return false;
        }
        match self.entry_mut(character) {
            Some(entry) => {
                entry.target = target;
                true
            }
            None => false,
        }
    }

    pub fn target_id(&self, character: CharacterId) -> Option<CharacterId> {
        self.entry(character).and_then(|e| e.target)
    }

    pub fn get_target<'w>(&self, world: &'w World, character: CharacterId) -> Option<&'w Character> {
        self.target_id(character).and_then(|t| world.get(t))
    }

    pub fn get_grappling_obj<'w>(&self, world: &'w World, character: CharacterId) -> Option<&'w Character> {
        self.entry(character).and_then(|e| e.grappling).and_then(|g| world.get(g))
    }

    pub fn get_grappled_by_obj<'w>(&self, world: &'w World, character: CharacterId) -> Option<&'w Character> {
        self.entry(character).and_then(|e| e.grappled_by).and_then(|g| world.get(g))
    }

    pub fn set_yielding(&mut self, character: CharacterId, yielding: bool) -> bool {
        match self.entry_mut(character) {
            Some(entry) => {
                entry.is_yielding = yielding;
                true
            }
            None => false,
        }
    }

    /// Queue an action for the character's next turn, replacing any queued one
    pub fn queue_action(&mut self, character: CharacterId, action: CombatAction, action_target: Option<CharacterId>) -> bool {
        match self.entry_mut(character) {
            Some(entry) => {
                entry.action = action;
                entry.action_target = action_target;
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_initiated(&mut self, character: CharacterId) {
        if let Some(entry) = self.entry_mut(character) {
            entry.initiated_combat_this_action = true;
        }
    }

    // === ROUNDS ===

    /// Turn order: initiative descending, earlier joiners first on ties
    pub fn initiative_order(&self) -> Vec<CharacterId> {
        let mut order: Vec<&CombatantEntry> = self.entries.iter().collect();
        order.sort_by(|a, b| b.initiative.cmp(&a.initiative).then(a.joined_seq.cmp(&b.joined_seq)));
        order.into_iter().map(|e| e.character).collect()
    }

    /// Resolve one round: every combatant acts in initiative order, then the
    /// fallen and orphaned are removed and grapple links are validated.
    pub fn resolve_round(&mut self, ctx: &mut CombatContext<'_>) -> RoundReport {
        let mut report = RoundReport::default();
        if !self.active {
            return report;
        }
        self.round += 1;
        report.round = self.round;

        for character in self.initiative_order() {
            // Removed earlier this round
            if !self.contains(character) {
                continue;
            }

            let able = ctx.world.get(character).is_some_and(Character::can_act);
            if !able {
                if let Some(entry) = self.entry_mut(character) {
                    entry.take_action();
                }
                continue;
            }

            report.acted.push(character);
            if let Err(err) = self.resolve_turn(ctx, character) {
                tracing::debug!(%character, error = %err, "action dropped");
                ctx.msg(character, err.to_string());
                report.failed.push((character, err));
            }

            report.fallen.extend(self.remove_fallen(ctx));
        }

        report.fallen.extend(self.remove_fallen(ctx));
        report.orphans = self.remove_orphans(ctx);
        report.repairs = grapple::validate_and_cleanup(self, ctx.world);

        for entry in &mut self.entries {
            entry.initiated_combat_this_action = false;
        }
        if self.entries.is_empty() {
            self.stop();
        }

        tracing::debug!(
            location = %self.location,
            round = self.round,
            acted = report.acted.len(),
            failed = report.failed.len(),
            removed = report.fallen.len() + report.orphans.len(),
            "round resolved"
        );
        report
    }

    fn resolve_turn(&mut self, ctx: &mut CombatContext<'_>, character: CharacterId) -> std::result::Result<(), ActionError> {
        let Some(entry) = self.entry_mut(character) else {
            return Ok(());
        };
        let (action, action_target) = entry.take_action();
        let (target, grappled, yielding) = (entry.target, entry.is_grappled(), entry.is_yielding);

        match action {
            CombatAction::None => {
                if grappled && !yielding {
                    grapple::resolve_escape(self, ctx, character).map(|_| ())
                } else if target.is_some() && !yielding {
                    resolve_attack(self, ctx, character, None).map(|_| ())
                } else {
                    Ok(())
                }
            }
            CombatAction::Attack => resolve_attack(self, ctx, character, action_target).map(|_| ()),
            CombatAction::GrappleInitiate => {
                grapple::resolve_initiate(self, ctx, character, action_target.or(target)).map(|_| ())
            }
            CombatAction::GrappleJoin => grapple::resolve_join(self, ctx, character, action_target.or(target)).map(|_| ()),
            CombatAction::GrappleTakeover => {
                grapple::resolve_takeover(self, ctx, character, action_target.or(target)).map(|_| ())
            }
            CombatAction::Escape => grapple::resolve_escape(self, ctx, character).map(|_| ()),
            CombatAction::Release => grapple::resolve_release(self, ctx, character),
            CombatAction::Disarm => resolve_disarm(self, ctx, character, action_target).map(|_| ()),
        }
    }

    /// Remove combatants who died or no longer exist
    fn remove_fallen(&mut self, ctx: &mut CombatContext<'_>) -> Vec<CharacterId> {
        let fallen: Vec<CharacterId> = self
            .entries
            .iter()
            .filter(|e| ctx.world.get(e.character).map_or(true, Character::is_dead))
            .map(|e| e.character)
            .collect();

        for character in &fallen {
            tracing::info!(%character, "combatant fell");
            self.remove_combatant(ctx, *character);
        }
        fallen
    }

    /// Combatants with no target, no grapple either way, and nobody targeting them.
    ///
    /// Yielding does not protect a combatant from being considered orphaned.
    pub fn find_orphans(&self) -> Vec<CharacterId> {
        self.entries
            .iter()
            .filter(|e| e.target.is_none() && e.grappling.is_none() && e.grappled_by.is_none())
            .filter(|e| self.attackers_of(e.character).is_empty())
            .map(|e| e.character)
            .collect()
    }

    fn remove_orphans(&mut self, ctx: &mut CombatContext<'_>) -> Vec<CharacterId> {
        let orphans = self.find_orphans();
        for character in &orphans {
            tracing::debug!(%character, "orphaned combatant removed");
            if self.remove_combatant(ctx, *character) {
                ctx.msg(*character, "No one is fighting you anymore. You are no longer in combat.");
            }
        }
        orphans
    }

    // === PERSISTENCE ===

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            location: self.location,
            round: self.round,
            active: self.active,
            entries: self.entries.clone(),
        }
    }

    /// Rebuild a session from a snapshot, repairing links to characters that
    /// no longer exist
    pub fn restore(snapshot: SessionSnapshot, world: &World) -> Self {
        let next_seq = snapshot.entries.iter().map(|e| e.joined_seq + 1).max().unwrap_or(0);
        let mut session = Self {
            location: snapshot.location,
            entries: snapshot.entries,
            active: snapshot.active,
            round: snapshot.round,
            next_seq,
        };
        session.entries.retain(|e| world.contains(e.character));
        grapple::validate_and_cleanup(&mut session, world);
        if session.entries.is_empty() {
            session.active = false;
        }
        session
    }
}

/// Persisted form of a combat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub location: LocationId,
    pub round: Round,
    pub active: bool,
    pub entries: Vec<CombatantEntry>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
