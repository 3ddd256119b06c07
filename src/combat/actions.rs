//! Attack and disarm resolution

use crate::combat::context::CombatContext;
use crate::combat::error::ActionError;
use crate::combat::grapple::validate_grapple_action;
use crate::combat::messages::{MessageContext, Phase};
use crate::combat::session::CombatSession;
use crate::core::config::config;
use crate::core::types::CharacterId;
use crate::entity::stats::Statted;
use crate::medical::damage::DamageReport;
use crate::medical::targeting::{select_hit_location, select_target_organ};

/// Result of one attack turn
#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    /// Out of reach with a melee weapon; the turn was spent closing in
    Closed,
    Missed { attacker_roll: u32, defender_roll: u32 },
    Hit { report: DamageReport, killed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisarmOutcome {
    Disarmed { weapon: String },
    Failed,
}

/// Resolve an attack by `actor` against `action_target`, or their current
/// target when none was queued.
///
/// Opposed motor-skill rolls decide the hit; the margin pulls the strike
/// toward vital locations, and a precise enough follow-up roll puts all of the
/// damage into a single organ.
pub fn resolve_attack(
    session: &mut CombatSession,
    ctx: &mut CombatContext<'_>,
    actor: CharacterId,
    action_target: Option<CharacterId>,
) -> Result<AttackOutcome, ActionError> {
    let target = action_target
        .or_else(|| session.target_id(actor))
        .ok_or(ActionError::NoTarget)?;
    if target == actor {
        return Err(ActionError::SelfTarget);
    }
    if !session.contains(target) {
        return Err(ActionError::TargetNotInCombat(ctx.name(target)));
    }
    let defender = ctx.world.get(target).ok_or_else(|| ActionError::NotHere(ctx.name(target)))?;
    if defender.is_dead() {
        return Err(ActionError::TargetDead(defender.name.clone()));
    }
    if !ctx.world.same_location(actor, target) {
        return Err(ActionError::NotHere(ctx.name(target)));
    }
    validate_grapple_action(session, ctx.world, actor, target, "attack")?;

    let attacker = ctx.world.get(actor).ok_or(ActionError::NotInCombat)?;
    let weapon = attacker.weapon();
    let attacker_skill = attacker.motorics();
    let (attacker_name, target_name) = (ctx.name(actor), ctx.name(target));

    if !weapon.is_ranged() && !ctx.proximity.is_in_proximity(actor, target) {
        ctx.proximity.establish(actor, target);
        tracing::debug!(%actor, %target, "closed to melee range");
        ctx.announce_text(
            actor,
            target,
            format!("You close in on {target_name}."),
            format!("{attacker_name} closes in on you."),
            format!("{attacker_name} closes in on {target_name}."),
        );
        return Ok(AttackOutcome::Closed);
    }

    let defender_skill = ctx.world.get(target).map_or(1, |c| c.motorics());
    let attacker_roll = ctx.dice.roll(attacker_skill);
    let defender_roll = ctx.dice.roll(defender_skill);
    let margin = attacker_roll as i32 - defender_roll as i32;

    if margin <= 0 {
        tracing::debug!(%actor, %target, attacker_roll, defender_roll, "attack missed");
        let message = ctx.catalog.lookup(
            weapon.category.key(),
            Phase::Miss,
            &MessageContext {
                attacker: &attacker_name,
                target: &target_name,
                item: &weapon.name,
                hit_location: None,
            },
        );
        ctx.announce(actor, target, message);
        return Ok(AttackOutcome::Missed { attacker_roll, defender_roll });
    }

    let settings = config();
    let Some(defender) = ctx.world.get(target) else {
        return Err(ActionError::NotHere(target_name));
    };
    let location = select_hit_location(&defender.body_locations, &defender.medical, margin, ctx.dice);
    let precision_roll = ctx.dice.roll(settings.precision_die);
    let target_organ = if precision_roll + attacker_skill >= settings.precision_targeting_threshold {
        select_target_organ(&defender.medical, &location, precision_roll, attacker_skill, ctx.dice)
    } else {
        None
    };

    let dice = &mut *ctx.dice;
    let Some(defender) = ctx.world.get_mut(target) else {
        return Err(ActionError::NotHere(target_name));
    };
    let report = defender.apply_anatomical_damage(
        weapon.damage,
        &location,
        weapon.category.injury_type(),
        target_organ.as_deref(),
        dice,
    );
    let killed = defender.is_dead();

    tracing::info!(
        %actor, %target,
        margin,
        location = %location,
        organ = ?target_organ,
        damage = report.total_damage,
        killed,
        "attack hit"
    );

    let phase = if killed { Phase::Kill } else { Phase::Hit };
    let message = ctx.catalog.lookup(
        weapon.category.key(),
        phase,
        &MessageContext {
            attacker: &attacker_name,
            target: &target_name,
            item: &weapon.name,
            hit_location: Some(&location),
        },
    );
    ctx.announce(actor, target, message);
    if !killed && !report.is_noop() {
        ctx.msg(target, report.describe());
    }

    if killed {
        session.remove_combatant(ctx, target);
    }
    Ok(AttackOutcome::Hit { report, killed })
}

/// Knock the wielded weapon out of the target's hands.
///
/// Requires melee range. The weapon lands on the ground where the target
/// stands.
pub fn resolve_disarm(
    session: &mut CombatSession,
    ctx: &mut CombatContext<'_>,
    actor: CharacterId,
    action_target: Option<CharacterId>,
) -> Result<DisarmOutcome, ActionError> {
    let target = action_target
        .or_else(|| session.target_id(actor))
        .ok_or(ActionError::NoTarget)?;
    if target == actor {
        return Err(ActionError::SelfTarget);
    }
    let target_name = ctx.name(target);
    let defender = ctx.world.get(target).ok_or_else(|| ActionError::NotHere(target_name.clone()))?;
    if defender.is_dead() {
        return Err(ActionError::TargetDead(target_name));
    }
    if !ctx.world.same_location(actor, target) {
        return Err(ActionError::NotHere(target_name));
    }
    if !ctx.proximity.is_in_proximity(actor, target) {
        return Err(ActionError::NotInProximity(target_name));
    }
    validate_grapple_action(session, ctx.world, actor, target, "disarm")?;
    if defender.wielded.is_none() {
        return Err(ActionError::NothingToDisarm(target_name));
    }

    let attacker_skill = ctx.world.get(actor).map_or(1, |c| c.motorics());
    let defender_grit = defender.grit();
    let attacker_roll = ctx.dice.roll(attacker_skill);
    let defender_roll = ctx.dice.roll(defender_grit);
    let actor_name = ctx.name(actor);

    tracing::debug!(%actor, %target, attacker_roll, defender_roll, "disarm attempt");

    if attacker_roll <= defender_roll {
        ctx.announce_text(
            actor,
            target,
            format!("You try to disarm {target_name}, but they keep their grip."),
            format!("{actor_name} tries to disarm you, but you keep your grip."),
            format!("{actor_name} tries to disarm {target_name}, but fails."),
        );
        return Ok(DisarmOutcome::Failed);
    }

    let Some(defender) = ctx.world.get_mut(target) else {
        return Err(ActionError::NotHere(target_name));
    };
    let location = defender.location;
    let Some(weapon) = defender.wielded.take() else {
        return Err(ActionError::NothingToDisarm(target_name));
    };
    let weapon_name = weapon.name.clone();
    ctx.world.drop_item(location, weapon);

    ctx.announce_text(
        actor,
        target,
        format!("You knock the {weapon_name} from {target_name}'s grasp!"),
        format!("{actor_name} knocks the {weapon_name} from your grasp!"),
        format!("{actor_name} knocks the {weapon_name} from {target_name}'s grasp. It clatters to the ground."),
    );
    Ok(DisarmOutcome::Disarmed { weapon: weapon_name })
}
