//! Player-facing combat commands
//!
//! Each command validates what it can up front, pulls the parties into the
//! local fight if needed, and queues an action for the actor's next turn. The
//! contest itself happens when the round resolves.

use crate::combat::aim::{AimTarget, AIMING_PLACE_PREFIX, SHOWDOWN_PLACE};
use crate::combat::entry::{CombatAction, JoinState};
use crate::combat::error::ActionError;
use crate::combat::grapple::{prepare_escape, validate_grapple_action};
use crate::combat::messages::{MessageContext, Phase};
use crate::core::dice::Dice;
use crate::core::types::CharacterId;
use crate::entity::character::IN_COMBAT_PLACE;
use crate::simulation::arena::Arena;

/// Which grapple contest a `grapple` command queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrappleKind {
    Initiate,
    Join,
    Takeover,
}

impl GrappleKind {
    fn action(self) -> CombatAction {
        match self {
            GrappleKind::Initiate => CombatAction::GrappleInitiate,
            GrappleKind::Join => CombatAction::GrappleJoin,
            GrappleKind::Takeover => CombatAction::GrappleTakeover,
        }
    }
}

fn aiming_place(name: &str) -> String {
    format!("{AIMING_PLACE_PREFIX} {name}.")
}

/// Placement text the engine owns and may overwrite
fn is_engine_place(place: &str) -> bool {
    place.is_empty() || place == IN_COMBAT_PLACE || place == SHOWDOWN_PLACE || place.starts_with(AIMING_PLACE_PREFIX)
}

impl<D: Dice> Arena<D> {
    /// Find someone in the actor's location by name
    pub fn find_target(&self, actor: CharacterId, query: &str) -> Result<CharacterId, ActionError> {
        let location = self.world.location_of(actor).ok_or(ActionError::NotInCombat)?;
        self.world
            .search(location, query)
            .into_iter()
            .next()
            .ok_or_else(|| ActionError::NoSuchTarget(query.trim().to_string()))
    }

    /// Checks shared by every command aimed at another character
    fn check_engage(&self, actor: CharacterId, target: CharacterId) -> Result<(), ActionError> {
        if actor == target {
            return Err(ActionError::SelfTarget);
        }
        let me = self.world.get(actor).ok_or(ActionError::Incapacitated)?;
        if !me.can_act() {
            return Err(ActionError::Incapacitated);
        }
        let other = self
            .world
            .get(target)
            .ok_or_else(|| ActionError::NotHere(self.world.name_of(target)))?;
        if other.location != me.location {
            return Err(ActionError::NotHere(other.name.clone()));
        }
        if other.is_dead() {
            return Err(ActionError::TargetDead(other.name.clone()));
        }
        Ok(())
    }

    /// Pull actor and target into the local fight.
    ///
    /// Returns whether each of them was newly added.
    fn engage(&mut self, actor: CharacterId, target: CharacterId, target_fights_back: bool) -> (bool, bool) {
        let actor_new = !self.in_combat(actor);
        let target_new = !self.in_combat(target);
        if actor_new {
            self.add_to_combat(actor, None, JoinState::default());
        }
        if target_new {
            let retaliate = target_fights_back.then_some(actor);
            self.add_to_combat(target, retaliate, JoinState::default());
        }
        (actor_new, target_new)
    }

    /// Start or continue attacking `target`
    pub fn attack(&mut self, actor: CharacterId, target: CharacterId) -> Result<(), ActionError> {
        self.check_engage(actor, target)?;
        if let Some(session) = self.session_of(actor) {
            validate_grapple_action(session, &self.world, actor, target, "attack")?;
        }

        let (actor_new, _) = self.engage(actor, target, true);
        let location = self.world.location_of(actor).ok_or(ActionError::NotInCombat)?;
        let session = self.sessions.get_mut(&location).ok_or(ActionError::NotInCombat)?;
        if session.target_id(target).is_none() {
            session.set_target(target, Some(actor));
        }
        session.set_target(actor, Some(target));
        session.set_yielding(actor, false);
        session.queue_action(actor, CombatAction::Attack, Some(target));
        if actor_new {
            session.mark_initiated(actor);
        }

        let (actor_name, target_name) = (self.world.name_of(actor), self.world.name_of(target));
        let weapon = self.world.get(actor).map(|c| c.weapon()).ok_or(ActionError::NotInCombat)?;
        let message = self.catalog.lookup(
            weapon.category.key(),
            Phase::Initiate,
            &MessageContext {
                attacker: &actor_name,
                target: &target_name,
                item: &weapon.name,
                hit_location: None,
            },
        );
        self.announce(actor, target, message);
        tracing::debug!(%actor, %target, new = actor_new, "attack queued");
        Ok(())
    }

    /// Queue a grapple on `target`.
    ///
    /// Takes over from a target who is holding someone, contests the holder
    /// of a target already held, and otherwise grabs the target outright.
    /// Melee range is not needed; a successful grapple closes in.
    pub fn grapple(&mut self, actor: CharacterId, target: CharacterId) -> Result<GrappleKind, ActionError> {
        self.check_engage(actor, target)?;
        if let Some(entry) = self.session_of(actor).and_then(|s| s.entry(actor)) {
            if let Some(victim) = entry.grappling {
                return Err(ActionError::AlreadyGrappling(self.world.name_of(victim)));
            }
        }
        if let Some(session) = self.session_of(actor) {
            validate_grapple_action(session, &self.world, actor, target, "grapple")?;
        }

        let (actor_new, target_new) = self.engage(actor, target, false);
        let location = self.world.location_of(actor).ok_or(ActionError::NotInCombat)?;
        let session = self.sessions.get_mut(&location).ok_or(ActionError::NotInCombat)?;
        let target_entry = session.entry(target).ok_or(ActionError::NotInCombat)?;

        let kind = if target_entry.grappling.is_some() {
            GrappleKind::Takeover
        } else if target_entry.grappled_by.is_some() {
            GrappleKind::Join
        } else {
            GrappleKind::Initiate
        };

        session.set_yielding(actor, false);
        session.set_target(actor, Some(target));
        session.queue_action(actor, kind.action(), Some(target));
        if actor_new {
            session.mark_initiated(actor);
        }
        if target_new {
            session.mark_initiated(target);
        }

        let target_name = self.world.name_of(target);
        self.outbox.msg(actor, format!("You prepare to grapple {target_name}."));
        tracing::debug!(%actor, %target, ?kind, "grapple queued");
        Ok(kind)
    }

    /// Queue an attempt to break free. The struggle stops any yielding.
    pub fn escape(&mut self, actor: CharacterId) -> Result<(), ActionError> {
        let location = self.session_of(actor).map(|s| s.location()).ok_or(ActionError::NotInCombat)?;
        let session = self.sessions.get_mut(&location).ok_or(ActionError::NotInCombat)?;
        let was_yielding = session.entry(actor).is_some_and(|e| e.is_yielding);
        let holder = prepare_escape(session, actor)?;
        session.queue_action(actor, CombatAction::Escape, Some(holder));

        let holder_name = self.world.name_of(holder);
        if was_yielding {
            self.outbox.msg(actor, format!("You stop going limp and fight {holder_name}'s hold!"));
        }
        self.outbox.msg(actor, format!("You prepare to struggle violently against {holder_name}'s hold!"));
        Ok(())
    }

    /// Queue letting go of the held victim
    pub fn release(&mut self, actor: CharacterId) -> Result<(), ActionError> {
        let location = self.session_of(actor).map(|s| s.location()).ok_or(ActionError::NotInCombat)?;
        let session = self.sessions.get_mut(&location).ok_or(ActionError::NotInCombat)?;
        let victim = session
            .entry(actor)
            .and_then(|e| e.grappling)
            .ok_or(ActionError::NotGrappling)?;
        session.queue_action(actor, CombatAction::Release, Some(victim));

        let victim_name = self.world.name_of(victim);
        self.outbox.msg(actor, format!("You prepare to release your hold on {victim_name}."));
        Ok(())
    }

    /// Queue a disarm against the current combat target
    pub fn disarm(&mut self, actor: CharacterId) -> Result<(), ActionError> {
        let session = self.session_of(actor).ok_or(ActionError::NotInCombat)?;
        let target = session.target_id(actor).ok_or(ActionError::NoTarget)?;
        let target_name = self.world.name_of(target);
        if !self.world.get(target).is_some_and(|c| !c.is_dead()) {
            return Err(ActionError::NoTarget);
        }
        if !self.proximity.is_in_proximity(actor, target) {
            return Err(ActionError::NotInProximity(target_name));
        }

        let location = session.location();
        if let Some(session) = self.sessions.get_mut(&location) {
            session.queue_action(actor, CombatAction::Disarm, Some(target));
        }
        self.outbox.msg(actor, format!("You prepare to disarm {target_name}."));
        Ok(())
    }

    /// Signal (or withdraw) non-aggressive intent
    pub fn set_yielding(&mut self, actor: CharacterId, yielding: bool) -> Result<(), ActionError> {
        let location = self.session_of(actor).map(|s| s.location()).ok_or(ActionError::NotInCombat)?;
        if let Some(session) = self.sessions.get_mut(&location) {
            session.set_yielding(actor, yielding);
        }
        let text = if yielding {
            "You lower your guard and stop fighting back."
        } else {
            "You steel yourself and resume fighting."
        };
        self.outbox.msg(actor, text);
        Ok(())
    }

    // === AIMING ===

    /// Aim at a character in the same location, or down an exit.
    ///
    /// Aiming down an exit needs a ranged weapon. Two characters aiming at
    /// each other end up in a showdown.
    pub fn aim(&mut self, actor: CharacterId, target: AimTarget) -> Result<(), ActionError> {
        match &target {
            AimTarget::Character(other) => self.check_engage(actor, *other)?,
            AimTarget::Direction(_) => {
                let me = self.world.get(actor).ok_or(ActionError::Incapacitated)?;
                if !me.can_act() {
                    return Err(ActionError::Incapacitated);
                }
                if !me.has_ranged_weapon() {
                    return Err(ActionError::NeedRangedWeapon);
                }
            }
        }

        if self.aim.target_of(actor).is_some() {
            self.stop_aim(actor)?;
        }
        self.aim.aim(actor, target.clone());

        let actor_name = self.world.name_of(actor);
        let location = self.world.location_of(actor);
        match target {
            AimTarget::Character(other) => {
                let other_name = self.world.name_of(other);
                if self.aim.is_mutual(actor, other) {
                    self.set_place(actor, SHOWDOWN_PLACE.to_string());
                    self.set_place(other, SHOWDOWN_PLACE.to_string());
                } else {
                    self.set_place(actor, aiming_place(&other_name));
                }
                self.outbox.msg(actor, format!("You take careful aim at {other_name}."));
                self.outbox.msg(other, format!("{actor_name} takes careful aim at you!"));
                if let Some(location) = location {
                    self.outbox
                        .msg_location(location, format!("{actor_name} takes careful aim at {other_name}."), &[actor, other]);
                }
            }
            AimTarget::Direction(direction) => {
                self.set_place(actor, aiming_place(&format!("the {direction} exit")));
                self.outbox.msg(actor, format!("You take careful aim to the {direction}."));
                if let Some(location) = location {
                    self.outbox
                        .msg_location(location, format!("{actor_name} takes careful aim toward the {direction}."), &[actor]);
                }
            }
        }
        tracing::debug!(%actor, "aiming");
        Ok(())
    }

    /// Stop aiming, restoring placement markers
    pub fn stop_aim(&mut self, actor: CharacterId) -> Result<(), ActionError> {
        let was_mutual_with = match self.aim.target_of(actor) {
            Some(AimTarget::Character(other)) if self.aim.is_mutual(actor, *other) => Some(*other),
            _ => None,
        };
        let Some(previous) = self.aim.stop(actor) else {
            return Ok(());
        };

        self.clear_place(actor);
        if let Some(other) = was_mutual_with {
            // The other side is still aiming at us
            let actor_name = self.world.name_of(actor);
            self.set_place(other, aiming_place(&actor_name));
        }

        if let AimTarget::Character(other) = previous {
            let actor_name = self.world.name_of(actor);
            let other_name = self.world.name_of(other);
            self.outbox.msg(actor, format!("You stop aiming at {other_name}."));
            self.outbox.msg(other, format!("{actor_name} stops aiming at you."));
        } else {
            self.outbox.msg(actor, "You lower your weapon.");
        }
        Ok(())
    }

    /// Overwrite an engine-owned placement marker; custom text is left alone
    fn set_place(&mut self, character: CharacterId, place: String) {
        if let Some(ch) = self.world.get_mut(character) {
            if is_engine_place(&ch.override_place) {
                ch.override_place = place;
            }
        }
    }

    /// Drop an aim marker, falling back to the combat marker while fighting
    pub(crate) fn clear_place(&mut self, character: CharacterId) {
        let fighting = self.in_combat(character);
        if let Some(ch) = self.world.get_mut(character) {
            let place = ch.override_place.as_str();
            if place == SHOWDOWN_PLACE || place.starts_with(AIMING_PLACE_PREFIX) {
                ch.override_place = if fighting { IN_COMBAT_PLACE.to_string() } else { String::new() };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::LocationId;
    use crate::entity::character::Character;
    use crate::entity::weapon::Weapon;
    use crate::entity::world::Location;

    fn arena() -> (Arena<ScriptedDice>, LocationId, CharacterId, CharacterId) {
        let mut arena = Arena::with_dice(ScriptedDice::default());
        let here = LocationId(1);
        arena.add_location(Location::new(here, "Alley"));
        let a = arena.spawn(Character::test_brawler("Ash", here));
        let b = arena.spawn(Character::test_brawler("Bo", here));
        (arena, here, a, b)
    }

    #[test]
    fn test_attack_pulls_both_into_combat() {
        let (mut arena, here, a, b) = arena();

        arena.attack(a, b).unwrap();

        let session = arena.session(here).unwrap();
        assert_eq!(session.target_id(a), Some(b));
        assert_eq!(session.target_id(b), Some(a));
        let entry = session.entry(a).unwrap();
        assert_eq!(entry.action, CombatAction::Attack);
        assert!(entry.initiated_combat_this_action);
        assert!(!session.entry(b).unwrap().initiated_combat_this_action);
    }

    #[test]
    fn test_attack_self_rejected() {
        let (mut arena, _, a, _) = arena();
        assert_eq!(arena.attack(a, a), Err(ActionError::SelfTarget));
        assert_eq!(arena.session_count(), 0);
    }

    #[test]
    fn test_find_target_by_prefix() {
        let (arena, _, a, b) = arena();
        assert_eq!(arena.find_target(a, "b"), Ok(b));
        assert_eq!(arena.find_target(a, "zed"), Err(ActionError::NoSuchTarget("zed".into())));
    }

    #[test]
    fn test_grapple_kind_follows_target_state() {
        let (mut arena, here, a, b) = arena();
        let c = arena.spawn(Character::test_brawler("Cy", here));

        assert_eq!(arena.grapple(a, b), Ok(GrappleKind::Initiate));
        let session = arena.sessions.get_mut(&here).unwrap();
        crate::combat::grapple::establish_grapple(session, a, b);

        assert_eq!(arena.grapple(c, b), Ok(GrappleKind::Join));
        assert_eq!(arena.grapple(c, a), Ok(GrappleKind::Takeover));
    }

    #[test]
    fn test_grapple_marks_both_new_parties() {
        let (mut arena, here, a, b) = arena();
        arena.grapple(a, b).unwrap();
        let session = arena.session(here).unwrap();
        assert!(session.entry(a).unwrap().initiated_combat_this_action);
        assert!(session.entry(b).unwrap().initiated_combat_this_action);
    }

    #[test]
    fn test_escape_requires_being_held() {
        let (mut arena, _, a, b) = arena();
        assert_eq!(arena.escape(a), Err(ActionError::NotInCombat));
        arena.attack(a, b).unwrap();
        assert_eq!(arena.escape(a), Err(ActionError::NotGrappled));
    }

    #[test]
    fn test_disarm_checks_proximity_up_front() {
        let (mut arena, _, a, b) = arena();
        arena.attack(a, b).unwrap();
        assert_eq!(arena.disarm(a), Err(ActionError::NotInProximity("Bo".into())));
    }

    #[test]
    fn test_mutual_aim_is_a_showdown() {
        let (mut arena, _, a, b) = arena();

        arena.aim(a, AimTarget::Character(b)).unwrap();
        assert_eq!(arena.world().get(a).unwrap().override_place, "aiming carefully at Bo.");

        arena.aim(b, AimTarget::Character(a)).unwrap();
        assert_eq!(arena.world().get(a).unwrap().override_place, SHOWDOWN_PLACE);
        assert_eq!(arena.world().get(b).unwrap().override_place, SHOWDOWN_PLACE);

        arena.stop_aim(a).unwrap();
        assert_eq!(arena.world().get(a).unwrap().override_place, "");
        assert_eq!(arena.world().get(b).unwrap().override_place, "aiming carefully at Ash.");
    }

    #[test]
    fn test_aim_direction_needs_ranged_weapon() {
        let (mut arena, _, a, _) = arena();
        assert_eq!(
            arena.aim(a, AimTarget::Direction("north".into())),
            Err(ActionError::NeedRangedWeapon)
        );
        arena.world_mut().get_mut(a).unwrap().wielded = Some(Weapon::pistol());
        assert!(arena.aim(a, AimTarget::Direction("north".into())).is_ok());
    }
}
