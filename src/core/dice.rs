//! Dice rolling behind an injectable trait
//!
//! Every random decision in combat and medical resolution goes through [`Dice`],
//! so runs can be reproduced from a seed and tests can script exact rolls.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform die rolls
pub trait Dice {
    /// Roll a die with `sides` faces, returning 1..=sides.
    ///
    /// A zero-sided die behaves like a one-sided die.
    fn roll(&mut self, sides: u32) -> u32;

    /// Roll a d100
    fn percent(&mut self) -> u32 {
        self.roll(100)
    }

    /// True with `percent` percent probability
    fn chance(&mut self, percent: u32) -> bool {
        self.percent() <= percent
    }

    /// Sum of `count` rolls of a `sides`-faced die
    fn roll_many(&mut self, count: u32, sides: u32) -> u32 {
        (0..count).map(|_| self.roll(sides)).sum()
    }
}

/// Seeded ChaCha-backed dice for reproducible runs
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed sequence of rolls
///
/// Each scripted value is clamped into the requested die's range. Once the
/// script runs out every roll returns the highest face, which keeps percentage
/// checks failing and opposed rolls tied.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    script: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: values.into_iter().collect(),
        }
    }

    /// Append more rolls to the end of the script
    pub fn push(&mut self, values: impl IntoIterator<Item = u32>) {
        self.script.extend(values);
    }

    /// Rolls not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        match self.script.pop_front() {
            Some(value) => value.clamp(1, sides),
            None => sides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_reproducible() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        let rolls_a: Vec<u32> = (0..20).map(|_| a.roll(20)).collect();
        let rolls_b: Vec<u32> = (0..20).map(|_| b.roll(20)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|r| (1..=20).contains(r)));
    }

    #[test]
    fn test_zero_sided_die_rolls_one() {
        let mut dice = SeededDice::new(1);
        assert_eq!(dice.roll(0), 1);
    }

    #[test]
    fn test_scripted_dice_replays_then_maxes() {
        let mut dice = ScriptedDice::new([3, 50]);
        assert_eq!(dice.roll(6), 3);
        // Clamped into the die's range
        assert_eq!(dice.roll(20), 20);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(dice.roll(8), 8);
    }

    #[test]
    fn test_chance_uses_percent_roll() {
        let mut dice = ScriptedDice::new([10, 11]);
        assert!(dice.chance(10));
        assert!(!dice.chance(10));
    }

    #[test]
    fn test_roll_many_sums() {
        let mut dice = ScriptedDice::new([1, 2, 3]);
        assert_eq!(dice.roll_many(3, 6), 6);
    }
}
