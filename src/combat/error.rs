use thiserror::Error;

/// Why a combat action could not be carried out.
///
/// The display text is sent to the character who attempted the action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("You are not in combat.")]
    NotInCombat,

    #[error("You have no target.")]
    NoTarget,

    #[error("You can't do that to yourself.")]
    SelfTarget,

    #[error("There is no one called '{0}' here.")]
    NoSuchTarget(String),

    #[error("{0} is not here.")]
    NotHere(String),

    #[error("{0} is not part of this fight.")]
    TargetNotInCombat(String),

    #[error("{0} is already dead.")]
    TargetDead(String),

    #[error("You are in no condition to do that.")]
    Incapacitated,

    #[error("You need to be in melee range of {0} to do that.")]
    NotInProximity(String),

    #[error("You are already grappling {0}.")]
    AlreadyGrappling(String),

    #[error("You are not grappling anyone.")]
    NotGrappling,

    #[error("You are not being held by anyone.")]
    NotGrappled,

    #[error("{0} is not grappled by anyone.")]
    TargetNotGrappled(String),

    #[error("{0} is not holding anyone.")]
    TargetNotGrappling(String),

    #[error("You cannot {action} while {grappler} has you in a grapple.")]
    Restrained { action: String, grappler: String },

    #[error("{0} has nothing in hand to take.")]
    NothingToDisarm(String),

    #[error("You need a ranged weapon to aim.")]
    NeedRangedWeapon,

    #[error("You can't move while {0} has you in their sights!")]
    AimLocked(String),

    #[error("You can't leave while in combat! Try to flee instead.")]
    CannotLeaveCombat,
}
