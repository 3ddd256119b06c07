//! Periodic condition ticking for one medical state

use crate::core::dice::Dice;
use crate::medical::state::MedicalState;

/// Summary of one medical tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub blood_lost: u32,
    pub conditions_ended: usize,
    /// The character died during this tick
    pub died: bool,
    pub fell_unconscious: bool,
}

/// Advance every condition by one tick, drop resolved ones, refresh vitals.
///
/// Corpses are not ticked.
pub fn tick_conditions(state: &mut MedicalState, dice: &mut dyn Dice) -> TickReport {
    let mut report = TickReport::default();
    if state.is_dead() {
        return report;
    }
    let was_unconscious = state.is_unconscious();

    let mut blood_lost = 0u32;
    for condition in state.conditions_mut().iter_mut() {
        let effect = condition.tick(dice);
        blood_lost += effect.blood_loss;
    }
    state.lose_blood(blood_lost);
    report.blood_lost = blood_lost;

    report.conditions_ended = state.remove_ended_conditions();
    state.update_vital_signs();

    report.died = state.is_dead();
    report.fell_unconscious = !was_unconscious && state.is_unconscious();

    tracing::debug!(
        blood_lost,
        ended = report.conditions_ended,
        blood = state.blood_level(),
        pain = state.pain_level(),
        consciousness = state.consciousness(),
        "conditions ticked"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::config;
    use crate::core::dice::ScriptedDice;
    use crate::medical::condition::Condition;

    #[test]
    fn test_bleeding_without_clotting() {
        let mut state = MedicalState::default();
        state.add_condition(Condition::bleeding(4, Some("chest")));
        let rate = config().blood_loss_for(4);

        let report = tick_conditions(&mut state, &mut ScriptedDice::new([100]));

        assert_eq!(report.blood_lost, rate);
        assert_eq!(state.blood_level(), 100.0 - rate as f32);
        assert_eq!(state.conditions()[0].severity, 4);
    }

    #[test]
    fn test_bleeding_with_clotting_same_tick() {
        let mut state = MedicalState::default();
        state.add_condition(Condition::bleeding(4, Some("chest")));
        let rate = config().blood_loss_for(4);

        let report = tick_conditions(&mut state, &mut ScriptedDice::new([1]));

        // Loss uses the severity at the start of the tick
        assert_eq!(report.blood_lost, rate);
        assert_eq!(state.blood_level(), 100.0 - rate as f32);
        assert_eq!(state.conditions()[0].severity, 3);
    }

    #[test]
    fn test_resolved_conditions_removed() {
        let mut state = MedicalState::default();
        state.add_condition(Condition::pain(1, None));
        let report = tick_conditions(&mut state, &mut ScriptedDice::new([1]));
        assert_eq!(report.conditions_ended, 1);
        assert!(state.conditions().is_empty());
        assert_eq!(state.pain_level(), 0.0);
    }

    #[test]
    fn test_bleeding_out_reports_death() {
        let mut state = MedicalState::default();
        state.set_blood_level(20.0);
        state.add_condition(Condition::bleeding(10, Some("neck")));

        let report = tick_conditions(&mut state, &mut ScriptedDice::new([100]));

        assert!(report.died);
        assert!(state.is_dead());

        // Corpses stay as they are
        let report = tick_conditions(&mut state, &mut ScriptedDice::new([100]));
        assert_eq!(report.blood_lost, 0);
    }
}
