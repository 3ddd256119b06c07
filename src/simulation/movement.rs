//! Leaving a location: aim locks, combat locks, and dragging a held victim

use crate::combat::entry::JoinState;
use crate::combat::error::ActionError;
use crate::combat::grapple::break_grapple;
use crate::core::dice::Dice;
use crate::core::types::{CharacterId, LocationId};
use crate::entity::stats::Statted;
use crate::simulation::arena::Arena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The held victim came along
    Dragged { victim: CharacterId },
    /// The victim broke free; nobody moved
    DragResisted { victim: CharacterId },
}

/// Everything a drag needs to carry over to the new session
struct DragPlan {
    grappler: CharacterId,
    victim: CharacterId,
    grappler_target: Option<CharacterId>,
    victim_target: Option<CharacterId>,
    victim_yielding: bool,
}

impl<D: Dice> Arena<D> {
    /// Move a character to another location.
    ///
    /// Someone with a gun trained on the mover pins them in place. A fighter
    /// cannot simply walk away; the one exception is a yielding grappler whom
    /// nobody but their own victim is attacking, who tries to drag the victim
    /// along.
    pub fn move_character(&mut self, mover: CharacterId, destination: LocationId) -> Result<MoveOutcome, ActionError> {
        let character = self.world.get(mover).ok_or(ActionError::Incapacitated)?;
        if !character.can_act() {
            return Err(ActionError::Incapacitated);
        }
        let origin = character.location;
        if origin == destination {
            return Ok(MoveOutcome::Moved);
        }

        self.check_aim_lock(mover, origin)?;

        let plan = match self.session_of(mover) {
            None => None,
            Some(session) => {
                let entry = session.entry(mover).ok_or(ActionError::NotInCombat)?;
                let Some(victim) = entry.grappling else {
                    return Err(ActionError::CannotLeaveCombat);
                };
                let others_attacking = session.attackers_of(mover).into_iter().any(|a| a != victim);
                if !entry.is_yielding || others_attacking {
                    return Err(ActionError::CannotLeaveCombat);
                }
                let victim_entry = session.entry(victim).ok_or(ActionError::CannotLeaveCombat)?;
                Some(DragPlan {
                    grappler: mover,
                    victim,
                    grappler_target: entry.target,
                    victim_target: victim_entry.target,
                    victim_yielding: victim_entry.is_yielding,
                })
            }
        };

        if self.aim.target_of(mover).is_some() {
            self.stop_aim(mover)?;
        }

        match plan {
            None => {
                self.relocate(mover, origin, destination)?;
                Ok(MoveOutcome::Moved)
            }
            Some(plan) => self.drag(plan, origin, destination),
        }
    }

    /// Refuse to move while someone present is aiming at the mover.
    ///
    /// Aims from characters who have left or vanished are dropped.
    fn check_aim_lock(&mut self, mover: CharacterId, origin: LocationId) -> Result<(), ActionError> {
        for aimer in self.aim.aimed_at_by(mover) {
            if self.world.location_of(aimer) == Some(origin) {
                return Err(ActionError::AimLocked(self.world.name_of(aimer)));
            }
            tracing::debug!(%aimer, %mover, "stale aim lock cleared");
            self.aim.stop(aimer);
            self.clear_place(aimer);
        }
        Ok(())
    }

    fn relocate(&mut self, mover: CharacterId, origin: LocationId, destination: LocationId) -> Result<(), ActionError> {
        let name = self.world.name_of(mover);
        self.proximity.clear(mover);
        self.world
            .relocate(mover, destination)
            .map_err(|_| ActionError::NotHere(name.clone()))?;
        self.outbox.msg_location(origin, format!("{name} leaves."), &[mover]);
        self.outbox.msg_location(destination, format!("{name} arrives."), &[mover]);
        tracing::debug!(character = %mover, from = %origin, to = %destination, "moved");
        Ok(())
    }

    /// Drag a held victim along. The victim resists with their own motor
    /// skill and wins ties.
    fn drag(&mut self, plan: DragPlan, origin: LocationId, destination: LocationId) -> Result<MoveOutcome, ActionError> {
        let DragPlan { grappler, victim, .. } = plan;
        let grappler_skill = self.world.get(grappler).map_or(1, |c| c.motorics());
        let victim_skill = self.world.get(victim).map_or(1, |c| c.motorics());
        let grappler_roll = self.dice.roll(grappler_skill);
        let victim_roll = self.dice.roll(victim_skill);
        let (grappler_name, victim_name) = (self.world.name_of(grappler), self.world.name_of(victim));

        tracing::debug!(%grappler, %victim, grappler_roll, victim_roll, "drag contest");

        if grappler_roll <= victim_roll {
            if let Some(session) = self.sessions.get_mut(&origin) {
                break_grapple(session, grappler, victim);
            }
            self.announce_text(
                grappler,
                victim,
                format!("{victim_name} twists free as you try to drag them away!"),
                format!("{grappler_name} tries to drag you away, but you twist free!"),
                format!("{victim_name} twists free of {grappler_name}'s grip."),
            );
            return Ok(MoveOutcome::DragResisted { victim });
        }

        // Tear down in the old room
        self.transfer_out_of_combat(origin, &[grappler, victim]);
        for aimer in self.aim.clear(victim) {
            self.clear_place(aimer);
        }
        self.clear_place(victim);

        self.relocate(grappler, origin, destination)?;
        self.proximity.clear(victim);
        self.world
            .relocate(victim, destination)
            .map_err(|_| ActionError::NotHere(victim_name.clone()))?;

        // Rebuild in the new room; initiative is rolled afresh
        self.add_to_combat(
            grappler,
            plan.grappler_target,
            JoinState {
                grappling: Some(victim),
                grappled_by: None,
                is_yielding: true,
            },
        );
        self.add_to_combat(
            victim,
            plan.victim_target,
            JoinState {
                grappling: None,
                grappled_by: Some(grappler),
                is_yielding: plan.victim_yielding,
            },
        );
        // The grappler's target was dropped while the victim was absent
        if plan.grappler_target == Some(victim) {
            if let Some(session) = self.sessions.get_mut(&destination) {
                session.set_target(grappler, Some(victim));
            }
        }

        self.outbox.msg(grappler, format!("You drag {victim_name} along with you."));
        self.outbox.msg(victim, format!("{grappler_name} drags you along!"));
        self.outbox
            .msg_location(destination, format!("{grappler_name} arrives, dragging {victim_name}."), &[grappler, victim]);
        tracing::info!(%grappler, %victim, from = %origin, to = %destination, "victim dragged");
        Ok(MoveOutcome::Dragged { victim })
    }

    fn announce_text(&mut self, actor: CharacterId, victim: CharacterId, to_actor: String, to_victim: String, to_room: String) {
        let (_, mut ctx) = self.split();
        ctx.announce_text(actor, victim, to_actor, to_victim, to_room);
    }
}
