//! Grapple relation manager
//!
//! A grapple is a directed 1:1 link: each combatant holds at most one victim
//! and is held by at most one grappler, and `A.grappling == B` exactly when
//! `B.grappled_by == A`. Contests use opposed motor-skill rolls; the defender
//! wins ties.

use ahash::AHashSet;

use crate::combat::context::CombatContext;
use crate::combat::error::ActionError;
use crate::combat::session::CombatSession;
use crate::core::types::CharacterId;
use crate::entity::stats::Statted;
use crate::entity::world::World;

/// Rolls from an opposed grapple contest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContestResult {
    pub success: bool,
    pub attacker_roll: u32,
    pub defender_roll: u32,
}

/// Opposed motor-skill roll. The attacker must beat the defender outright.
pub fn opposed_roll(ctx: &mut CombatContext<'_>, attacker: CharacterId, defender: CharacterId) -> ContestResult {
    let attacker_skill = ctx.world.get(attacker).map_or(1, |c| c.motorics());
    let defender_skill = ctx.world.get(defender).map_or(1, |c| c.motorics());
    let attacker_roll = ctx.dice.roll(attacker_skill);
    let defender_roll = ctx.dice.roll(defender_skill);
    ContestResult {
        success: attacker_roll > defender_roll,
        attacker_roll,
        defender_roll,
    }
}

/// Link grappler to victim. Both must be free in the relevant direction.
pub fn establish_grapple(session: &mut CombatSession, grappler: CharacterId, victim: CharacterId) -> bool {
    if grappler == victim {
        return false;
    }
    let (Some(g), Some(v)) = (session.entry(grappler), session.entry(victim)) else {
        return false;
    };
    if g.grappling.is_some() || v.grappled_by.is_some() || g.grappled_by == Some(victim) {
        return false;
    }
    if let Some(entry) = session.entry_mut(grappler) {
        entry.grappling = Some(victim);
    }
    if let Some(entry) = session.entry_mut(victim) {
        entry.grappled_by = Some(grappler);
    }
    true
}

/// Clear the link between grappler and victim, whichever side still claims it
pub fn break_grapple(session: &mut CombatSession, grappler: CharacterId, victim: CharacterId) {
    if let Some(entry) = session.entry_mut(grappler) {
        if entry.grappling == Some(victim) {
            entry.grappling = None;
        }
    }
    if let Some(entry) = session.entry_mut(victim) {
        if entry.grappled_by == Some(grappler) {
            entry.grappled_by = None;
        }
    }
}

/// A held character may only act against whoever is holding them
pub fn validate_grapple_action(
    session: &CombatSession,
    world: &World,
    actor: CharacterId,
    target: CharacterId,
    action: &str,
) -> Result<(), ActionError> {
    match session.entry(actor).and_then(|e| e.grappled_by) {
        Some(grappler) if grappler != target => Err(ActionError::Restrained {
            action: action.to_string(),
            grappler: world.name_of(grappler),
        }),
        _ => Ok(()),
    }
}

/// Common checks for any action aimed at another combatant
fn check_target(
    session: &CombatSession,
    ctx: &CombatContext<'_>,
    actor: CharacterId,
    target: Option<CharacterId>,
) -> Result<CharacterId, ActionError> {
    let target = target.ok_or(ActionError::NoTarget)?;
    if target == actor {
        return Err(ActionError::SelfTarget);
    }
    let name = ctx.name(target);
    let character = ctx.world.get(target).ok_or_else(|| ActionError::NotHere(name.clone()))?;
    if character.is_dead() {
        return Err(ActionError::TargetDead(name));
    }
    if !session.contains(target) {
        return Err(ActionError::TargetNotInCombat(name));
    }
    if !ctx.world.same_location(actor, target) {
        return Err(ActionError::NotHere(name));
    }
    Ok(target)
}

/// Grab a target nobody else is holding.
///
/// Winning makes the attacker a (yielding) grappler and puts the pair in
/// melee range. Losing a grapple that opened the fight reads as a non-hostile
/// overture: both sides stand down.
pub fn resolve_initiate(
    session: &mut CombatSession,
    ctx: &mut CombatContext<'_>,
    actor: CharacterId,
    target: Option<CharacterId>,
) -> Result<ContestResult, ActionError> {
    let target = check_target(session, ctx, actor, target)?;
    validate_grapple_action(session, ctx.world, actor, target, "grapple")?;

    let (Some(actor_entry), Some(target_entry)) = (session.entry(actor), session.entry(target)) else {
        return Err(ActionError::NotInCombat);
    };
    if let Some(victim) = actor_entry.grappling {
        return Err(ActionError::AlreadyGrappling(ctx.name(victim)));
    }
    if let Some(holder) = target_entry.grappled_by {
        // Someone got there first since the action was queued
        if holder == actor {
            return Err(ActionError::AlreadyGrappling(ctx.name(target)));
        }
        return resolve_join(session, ctx, actor, Some(target));
    }
    // The victim held by the actor cannot in turn hold the actor
    if actor_entry.grappled_by == Some(target) {
        return Err(ActionError::Restrained {
            action: "grapple".into(),
            grappler: ctx.name(target),
        });
    }
    let initiated = actor_entry.initiated_combat_this_action || target_entry.initiated_combat_this_action;

    let contest = opposed_roll(ctx, actor, target);
    let (actor_name, target_name) = (ctx.name(actor), ctx.name(target));
    tracing::debug!(
        %actor, %target,
        attacker_roll = contest.attacker_roll,
        defender_roll = contest.defender_roll,
        success = contest.success,
        "grapple initiate"
    );

    if contest.success {
        establish_grapple(session, actor, target);
        ctx.proximity.establish(actor, target);
        session.set_yielding(actor, true);
        session.set_target(target, Some(actor));
        ctx.announce_text(
            actor,
            target,
            format!("You seize {target_name} in a firm grapple!"),
            format!("{actor_name} seizes you in a firm grapple!"),
            format!("{actor_name} seizes {target_name} in a grapple."),
        );
    } else {
        if initiated {
            session.set_yielding(actor, true);
            session.set_yielding(target, true);
        }
        ctx.announce_text(
            actor,
            target,
            format!("You try to grab {target_name}, but they slip away."),
            format!("{actor_name} tries to grab you, but you slip away."),
            format!("{actor_name} tries to grab {target_name}, but fails."),
        );
    }
    Ok(contest)
}

/// Challenge whoever is holding `victim` for control of the hold.
///
/// The contest is against the current grappler, not the victim. On success
/// the hold passes to the challenger in one step.
pub fn resolve_join(
    session: &mut CombatSession,
    ctx: &mut CombatContext<'_>,
    challenger: CharacterId,
    victim: Option<CharacterId>,
) -> Result<ContestResult, ActionError> {
    let victim = check_target(session, ctx, challenger, victim)?;
    validate_grapple_action(session, ctx.world, challenger, victim, "grapple")?;

    let Some(challenger_entry) = session.entry(challenger) else {
        return Err(ActionError::NotInCombat);
    };
    if let Some(held) = challenger_entry.grappling {
        return Err(ActionError::AlreadyGrappling(ctx.name(held)));
    }
    let initiated = challenger_entry.initiated_combat_this_action;
    let holder = match session.entry(victim).and_then(|e| e.grappled_by) {
        Some(holder) if holder == challenger => return Err(ActionError::AlreadyGrappling(ctx.name(victim))),
        Some(holder) => holder,
        None => return Err(ActionError::TargetNotGrappled(ctx.name(victim))),
    };

    let contest = opposed_roll(ctx, challenger, holder);
    let (challenger_name, holder_name, victim_name) = (ctx.name(challenger), ctx.name(holder), ctx.name(victim));
    tracing::debug!(
        %challenger, %holder, %victim,
        attacker_roll = contest.attacker_roll,
        defender_roll = contest.defender_roll,
        success = contest.success,
        "grapple join"
    );

    if contest.success {
        break_grapple(session, holder, victim);
        establish_grapple(session, challenger, victim);
        ctx.proximity.establish(challenger, victim);
        session.set_yielding(challenger, true);
        ctx.announce_text(
            challenger,
            holder,
            format!("You wrench {victim_name} out of {holder_name}'s grip and take hold yourself!"),
            format!("{challenger_name} wrenches {victim_name} out of your grip!"),
            format!("{challenger_name} wrenches {victim_name} out of {holder_name}'s grip."),
        );
        ctx.msg(victim, format!("{challenger_name} takes hold of you."));
    } else {
        if initiated {
            session.set_yielding(challenger, true);
        }
        ctx.announce_text(
            challenger,
            holder,
            format!("You fail to break {holder_name}'s hold on {victim_name}."),
            format!("{challenger_name} fails to break your hold on {victim_name}."),
            format!("{challenger_name} fails to break {holder_name}'s hold on {victim_name}."),
        );
    }
    Ok(contest)
}

/// Wrestle a grappler off their victim and take hold of the grappler instead
pub fn resolve_takeover(
    session: &mut CombatSession,
    ctx: &mut CombatContext<'_>,
    challenger: CharacterId,
    grappler: Option<CharacterId>,
) -> Result<ContestResult, ActionError> {
    let grappler = check_target(session, ctx, challenger, grappler)?;
    validate_grapple_action(session, ctx.world, challenger, grappler, "grapple")?;

    let Some(challenger_entry) = session.entry(challenger) else {
        return Err(ActionError::NotInCombat);
    };
    if let Some(held) = challenger_entry.grappling {
        return Err(ActionError::AlreadyGrappling(ctx.name(held)));
    }
    let initiated = challenger_entry.initiated_combat_this_action;
    let Some(grappler_entry) = session.entry(grappler) else {
        return Err(ActionError::TargetNotInCombat(ctx.name(grappler)));
    };
    if grappler_entry.grappled_by.is_some() {
        return resolve_join(session, ctx, challenger, Some(grappler));
    }
    let Some(victim) = grappler_entry.grappling else {
        return Err(ActionError::TargetNotGrappling(ctx.name(grappler)));
    };
    if victim == challenger {
        return Err(ActionError::Restrained {
            action: "grapple".into(),
            grappler: ctx.name(grappler),
        });
    }

    let contest = opposed_roll(ctx, challenger, grappler);
    let (challenger_name, grappler_name, victim_name) = (ctx.name(challenger), ctx.name(grappler), ctx.name(victim));
    tracing::debug!(
        %challenger, %grappler, %victim,
        attacker_roll = contest.attacker_roll,
        defender_roll = contest.defender_roll,
        success = contest.success,
        "grapple takeover"
    );

    if contest.success {
        break_grapple(session, grappler, victim);
        establish_grapple(session, challenger, grappler);
        ctx.proximity.establish(challenger, grappler);
        session.set_yielding(challenger, true);
        ctx.announce_text(
            challenger,
            grappler,
            format!("You tear {grappler_name} off {victim_name} and pin them!"),
            format!("{challenger_name} tears you off {victim_name} and pins you!"),
            format!("{challenger_name} tears {grappler_name} off {victim_name}."),
        );
        ctx.msg(victim, format!("{challenger_name} tears {grappler_name} off you. You are free!"));
    } else {
        if initiated {
            session.set_yielding(challenger, true);
        }
        ctx.announce_text(
            challenger,
            grappler,
            format!("You fail to pull {grappler_name} off {victim_name}."),
            format!("{challenger_name} tries to pull you off {victim_name}, but you hold on."),
            format!("{challenger_name} fails to pull {grappler_name} off {victim_name}."),
        );
    }
    Ok(contest)
}

/// Let go of the held victim. Always succeeds; nobody's intent changes.
pub fn resolve_release(
    session: &mut CombatSession,
    ctx: &mut CombatContext<'_>,
    actor: CharacterId,
) -> Result<(), ActionError> {
    let victim = session
        .entry(actor)
        .ok_or(ActionError::NotInCombat)?
        .grappling
        .ok_or(ActionError::NotGrappling)?;

    break_grapple(session, actor, victim);

    let (actor_name, victim_name) = (ctx.name(actor), ctx.name(victim));
    tracing::debug!(%actor, %victim, "grapple released");
    ctx.announce_text(
        actor,
        victim,
        format!("You release {victim_name}."),
        format!("{actor_name} releases you."),
        format!("{actor_name} releases {victim_name}."),
    );
    Ok(())
}

/// Mark a held character as actively struggling.
///
/// Called when the escape is queued; the contest itself happens on their turn.
pub fn prepare_escape(session: &mut CombatSession, actor: CharacterId) -> Result<CharacterId, ActionError> {
    let holder = session
        .entry(actor)
        .ok_or(ActionError::NotInCombat)?
        .grappled_by
        .ok_or(ActionError::NotGrappled)?;
    session.set_yielding(actor, false);
    Ok(holder)
}

/// Struggle free of the current grappler
pub fn resolve_escape(
    session: &mut CombatSession,
    ctx: &mut CombatContext<'_>,
    actor: CharacterId,
) -> Result<ContestResult, ActionError> {
    let holder = prepare_escape(session, actor)?;

    let contest = opposed_roll(ctx, actor, holder);
    let (actor_name, holder_name) = (ctx.name(actor), ctx.name(holder));
    tracing::debug!(
        %actor, %holder,
        attacker_roll = contest.attacker_roll,
        defender_roll = contest.defender_roll,
        success = contest.success,
        "grapple escape"
    );

    if contest.success {
        break_grapple(session, holder, actor);
        ctx.announce_text(
            actor,
            holder,
            format!("You break free of {holder_name}'s grip!"),
            format!("{actor_name} breaks free of your grip!"),
            format!("{actor_name} breaks free of {holder_name}'s grip."),
        );
    } else {
        ctx.announce_text(
            actor,
            holder,
            format!("You struggle against {holder_name}'s grip, but can't break free."),
            format!("{actor_name} struggles against your grip, but you hold firm."),
            format!("{actor_name} struggles in {holder_name}'s grip."),
        );
    }
    Ok(contest)
}

/// Repair grapple links across the roster, returning how many fixes were made.
///
/// Clears links to characters that no longer exist, to themselves, or to
/// anyone outside the session, along with targets pointing the same way. An
/// asymmetric pair is settled in favor of the side still claiming the link:
/// the grappler's claim wins, and a lone `grappled_by` claim is honoured only
/// if the named grappler is free.
pub fn validate_and_cleanup(session: &mut CombatSession, world: &World) -> usize {
    let mut repairs = 0;
    let members: AHashSet<CharacterId> = session.members().into_iter().collect();

    // Stale, self, and out-of-session references
    for entry in session.entries_mut() {
        let me = entry.character;
        let valid = |other: CharacterId| other != me && world.contains(other) && members.contains(&other);

        for (kind, link) in [("grappling", &mut entry.grappling), ("grappled_by", &mut entry.grappled_by), ("target", &mut entry.target)] {
            if let Some(other) = *link {
                if !valid(other) {
                    tracing::warn!(character = %me, %other, kind, "cleared invalid reference");
                    *link = None;
                    repairs += 1;
                }
            }
        }
    }

    // Grappler claims are authoritative. First claim on a victim wins, and a
    // pair claiming each other keeps only the first direction seen.
    let claims: Vec<(CharacterId, CharacterId)> = session
        .entries()
        .iter()
        .filter_map(|e| e.grappling.map(|v| (e.character, v)))
        .collect();
    let mut accepted: Vec<(CharacterId, CharacterId)> = Vec::new();
    for (grappler, victim) in claims {
        let victim_taken = accepted.iter().any(|(_, v)| *v == victim);
        let reversed = accepted.iter().any(|pair| *pair == (victim, grappler));
        if victim_taken || reversed {
            tracing::warn!(%grappler, %victim, "conflicting grapple claim dropped");
            if let Some(entry) = session.entry_mut(grappler) {
                entry.grappling = None;
            }
            repairs += 1;
        } else {
            accepted.push((grappler, victim));
        }
    }
    for (grappler, victim) in &accepted {
        if let Some(entry) = session.entry_mut(*victim) {
            if entry.grappled_by != Some(*grappler) {
                tracing::warn!(%grappler, %victim, "victim side of grapple repaired");
                entry.grappled_by = Some(*grappler);
                repairs += 1;
            }
        }
    }

    // Lone grappled_by claims
    let dangling: Vec<(CharacterId, CharacterId)> = session
        .entries()
        .iter()
        .filter_map(|e| e.grappled_by.map(|g| (g, e.character)))
        .filter(|pair| !accepted.contains(pair))
        .collect();
    for (grappler, victim) in dangling {
        let grappler_free = session
            .entry(grappler)
            .is_some_and(|g| g.grappling.is_none() && g.grappled_by != Some(victim));
        if grappler_free {
            tracing::warn!(%grappler, %victim, "grappler side of grapple repaired");
            if let Some(entry) = session.entry_mut(grappler) {
                entry.grappling = Some(victim);
            }
            accepted.push((grappler, victim));
        } else {
            tracing::warn!(%grappler, %victim, "unclaimed grappled_by cleared");
            if let Some(entry) = session.entry_mut(victim) {
                entry.grappled_by = None;
            }
        }
        repairs += 1;
    }

    repairs
}

/// True when every grapple link in the session has its mirror
pub fn is_consistent(session: &CombatSession) -> bool {
    session.entries().iter().all(|e| {
        let out_ok = e
            .grappling
            .map_or(true, |v| session.entry(v).is_some_and(|ve| ve.grappled_by == Some(e.character)));
        let in_ok = e
            .grappled_by
            .map_or(true, |g| session.entry(g).is_some_and(|ge| ge.grappling == Some(e.character)));
        out_ok && in_ok
    })
}
