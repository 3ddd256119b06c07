//! Splatter - combat sessions and anatomical damage for a text game
//!
//! Tracks who is fighting whom in each location, resolves attacks, grapples,
//! disarms and drags, and carries every wound through to organs, blood, pain
//! and consciousness.

pub mod combat;
pub mod core;
pub mod entity;
pub mod medical;
pub mod simulation;
