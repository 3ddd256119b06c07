pub mod config;
pub mod dice;
pub mod error;
pub mod outbox;
pub mod scheduler;
pub mod types;

pub use config::{config, EngineConfig};
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use error::{EngineError, Result};
pub use outbox::{Message, Outbox, Recipient};
pub use scheduler::{ScheduledTick, TickScheduler};
pub use types::{CharacterId, LocationId, Round};
