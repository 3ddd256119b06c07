pub mod character;
pub mod stats;
pub mod weapon;
pub mod world;

pub use character::{Character, IN_COMBAT_PLACE};
pub use stats::{Stats, Statted, DEFAULT_STAT};
pub use weapon::{Weapon, WeaponCategory};
pub use world::{Location, World};
