//! Combat sessions: roster, grapples, proximity, and action resolution

pub mod actions;
pub mod aim;
pub mod context;
pub mod entry;
pub mod error;
pub mod grapple;
pub mod messages;
pub mod proximity;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{resolve_attack, resolve_disarm, AttackOutcome, DisarmOutcome};
pub use aim::{AimTable, AimTarget, AIMING_PLACE_PREFIX, SHOWDOWN_PLACE};
pub use context::CombatContext;
pub use entry::{CombatAction, CombatantEntry, JoinState};
pub use error::ActionError;
pub use grapple::{break_grapple, establish_grapple, validate_and_cleanup, validate_grapple_action, ContestResult};
pub use messages::{CombatMessage, FallbackCatalog, MessageCatalog, MessageContext, Phase};
pub use proximity::ProximityGraph;
pub use session::{CombatSession, RoundReport, SessionSnapshot};
