//! Discrete tick scheduler
//!
//! One clock drives two independent periodic events: combat rounds and the
//! slower medical condition ticks.

use crate::core::config::EngineConfig;

/// A scheduled event that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTick {
    CombatRound,
    MedicalTick,
}

#[derive(Debug, Clone)]
pub struct TickScheduler {
    round_seconds: u32,
    medical_seconds: u32,
    /// Seconds elapsed since the scheduler started
    now: u64,
    next_round: u64,
    next_medical: u64,
}

impl TickScheduler {
    pub fn new(round_seconds: u32, medical_seconds: u32) -> Self {
        let round_seconds = round_seconds.max(1);
        let medical_seconds = medical_seconds.max(1);
        Self {
            round_seconds,
            medical_seconds,
            now: 0,
            next_round: round_seconds as u64,
            next_medical: medical_seconds as u64,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.round_seconds, config.medical_tick_seconds)
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance the clock, returning every tick that came due in time order.
    ///
    /// When both fall on the same second the combat round runs first.
    pub fn advance(&mut self, seconds: u64) -> Vec<ScheduledTick> {
        let target = self.now + seconds;
        let mut due = Vec::new();

        loop {
            let next = self.next_round.min(self.next_medical);
            if next > target {
                break;
            }
            if self.next_round == next {
                due.push(ScheduledTick::CombatRound);
                self.next_round += self.round_seconds as u64;
            }
            if self.next_medical == next {
                due.push(ScheduledTick::MedicalTick);
                self.next_medical += self.medical_seconds as u64;
            }
        }

        self.now = target;
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_and_medical_interleave() {
        let mut scheduler = TickScheduler::new(6, 12);
        let due = scheduler.advance(24);
        assert_eq!(
            due,
            vec![
                ScheduledTick::CombatRound,
                ScheduledTick::CombatRound,
                ScheduledTick::MedicalTick,
                ScheduledTick::CombatRound,
                ScheduledTick::CombatRound,
                ScheduledTick::MedicalTick,
            ]
        );
        assert_eq!(scheduler.now(), 24);
    }

    #[test]
    fn test_partial_advances_accumulate() {
        let mut scheduler = TickScheduler::new(6, 12);
        assert!(scheduler.advance(5).is_empty());
        assert_eq!(scheduler.advance(1), vec![ScheduledTick::CombatRound]);
    }
}
