//! Weighted hit-location and organ selection

use crate::core::dice::Dice;
use crate::medical::anatomy::{is_vital_location, FALLBACK_LOCATION};
use crate::medical::state::MedicalState;

/// Multiplier on vital-location weight for a given hit margin
pub fn vital_bias(success_margin: i32) -> f32 {
    match success_margin {
        m if m <= 3 => 1.25,
        m if m <= 8 => 1.5,
        m if m <= 15 => 2.0,
        _ => 3.0,
    }
}

/// Pick an index with probability proportional to its weight.
///
/// Returns None only for an empty list. All weights should be at least 1.
pub fn weighted_pick(weights: &[u32], dice: &mut dyn Dice) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if weights.is_empty() || total == 0 {
        return None;
    }

    let mut remaining = dice.roll(total);
    for (index, &weight) in weights.iter().enumerate() {
        if remaining <= weight {
            return Some(index);
        }
        remaining -= weight;
    }
    Some(weights.len() - 1)
}

/// Choose which body location a hit lands on.
///
/// A location weighs the sum of its organs' hit weights. A positive hit
/// margin pulls strikes toward vital locations.
pub fn select_hit_location(
    locations: &[String],
    state: &MedicalState,
    success_margin: i32,
    dice: &mut dyn Dice,
) -> String {
    if locations.is_empty() {
        return FALLBACK_LOCATION.to_string();
    }

    let weights: Vec<u32> = locations
        .iter()
        .map(|location| {
            let base: u32 = state.organs_in(location).map(|o| o.hit_weight.value()).sum();
            let weight = if success_margin > 0 && is_vital_location(location) {
                (base as f32 * vital_bias(success_margin)) as u32
            } else {
                base
            };
            weight.max(1)
        })
        .collect();

    match weighted_pick(&weights, dice) {
        Some(index) => locations[index].clone(),
        None => FALLBACK_LOCATION.to_string(),
    }
}

/// Choose which organ within a location a precise strike goes for.
///
/// Returns None if the location has no organs.
pub fn select_target_organ(
    state: &MedicalState,
    location: &str,
    precision_roll: u32,
    attacker_skill: u32,
    dice: &mut dyn Dice,
) -> Option<String> {
    let precision = precision_roll + attacker_skill;
    let organs: Vec<_> = state.organs_in(location).collect();

    let weights: Vec<u32> = organs
        .iter()
        .map(|o| {
            let weight = o.hit_weight.value() as f32 * o.hit_weight.precision_modifier(precision);
            (weight as u32).max(1)
        })
        .collect();

    weighted_pick(&weights, dice).map(|index| organs[index].name.clone())
}
