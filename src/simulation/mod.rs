//! Engine driver: session registry, player commands, movement, and ticks

pub mod arena;
pub mod commands;
pub mod movement;

pub use arena::{AdvanceReport, Arena, CombatSnapshot};
pub use commands::GrappleKind;
pub use movement::MoveOutcome;
