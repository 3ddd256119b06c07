//! Typed stat access with guaranteed fallbacks

use serde::{Deserialize, Serialize};

/// Value used for any stat that is missing or not positive
pub const DEFAULT_STAT: u32 = 1;

/// Raw stats as stored on a character. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub motorics: Option<i32>,
    pub grit: Option<i32>,
    pub intellect: Option<i32>,
}

impl Stats {
    pub fn new(motorics: i32, grit: i32, intellect: i32) -> Self {
        Self {
            motorics: Some(motorics),
            grit: Some(grit),
            intellect: Some(intellect),
        }
    }
}

fn or_default(value: Option<i32>) -> u32 {
    match value {
        Some(v) if v > 0 => v as u32,
        _ => DEFAULT_STAT,
    }
}

/// Anything with stats. Accessors never fail: missing data reads as the default.
pub trait Statted {
    fn stats(&self) -> &Stats;

    /// Coordination and speed: initiative, grapples, attacks
    fn motorics(&self) -> u32 {
        or_default(self.stats().motorics)
    }

    /// Toughness: resisting disarms
    fn grit(&self) -> u32 {
        or_default(self.stats().grit)
    }

    /// Reasoning: medical skill
    fn intellect(&self) -> u32 {
        or_default(self.stats().intellect)
    }
}

impl Statted for Stats {
    fn stats(&self) -> &Stats {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stats_default_to_one() {
        let stats = Stats::default();
        assert_eq!(stats.motorics(), 1);
        assert_eq!(stats.grit(), 1);
        assert_eq!(stats.intellect(), 1);
    }

    #[test]
    fn test_non_positive_stats_default_to_one() {
        let stats = Stats {
            motorics: Some(0),
            grit: Some(-3),
            intellect: Some(7),
        };
        assert_eq!(stats.motorics(), 1);
        assert_eq!(stats.grit(), 1);
        assert_eq!(stats.intellect(), 7);
    }
}
