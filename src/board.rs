use bevy::math::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

// SETTINGS - fixed 4x4 board in a fixed 640x480 window
pub const WINDOW_WIDTH: f32 = 640.0;
pub const WINDOW_HEIGHT: f32 = 480.0;

pub const GRID_COLS: usize = 4;
pub const GRID_ROWS: usize = 4;
pub const CARD_COUNT: usize = GRID_COLS * GRID_ROWS;

pub const CARD_HEIGHT: f32 = 75.0;
pub const CARD_WIDTH: f32 = CARD_HEIGHT * 1.5;
pub const SPACING: f32 = 10.0;
pub const BORDER: f32 = SPACING * 1.5;

/// One hidden value per pair; `deal` duplicates each exactly once.
pub const NAMES: [&str; 8] = [
    "comet", "nebula", "quasar", "pulsar", "meteor", "nova", "orbit", "lunar",
];

/// Two cards per name, shuffled into slot order (row-major, top-left first).
pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static str> {
    let mut values: Vec<&'static str> = NAMES.iter().flat_map(|&name| [name, name]).collect();
    values.shuffle(rng);
    values
}

/// World-space center of a slot. Slots count row-major from the top-left;
/// world coordinates are Bevy's y-up with the origin at the window center.
pub fn slot_center(slot: usize) -> Vec2 {
    let col = (slot % GRID_COLS) as f32;
    let row = (slot / GRID_COLS) as f32;
    let left = BORDER + col * (SPACING + CARD_WIDTH);
    let top = BORDER + row * (SPACING + CARD_HEIGHT);
    Vec2::new(
        left + CARD_WIDTH / 2.0 - WINDOW_WIDTH / 2.0,
        WINDOW_HEIGHT / 2.0 - (top + CARD_HEIGHT / 2.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{evaluate_board, CardState, PairOutcome, FAIL_TIMEOUT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn every_name_appears_exactly_twice_for_any_shuffle() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let values = deal(&mut rng);
            assert_eq!(values.len(), CARD_COUNT);

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for &value in &values {
                *counts.entry(value).or_default() += 1;
            }
            assert_eq!(counts.len(), NAMES.len());
            assert!(counts.values().all(|&n| n == 2), "seed {seed}: {counts:?}");
        }
    }

    #[test]
    fn grid_centers_are_laid_out_with_uniform_spacing() {
        let first = slot_center(0);
        assert_eq!(first, Vec2::new(-248.75, 187.5));

        // One step right, one step down.
        assert_eq!(
            slot_center(1) - first,
            Vec2::new(CARD_WIDTH + SPACING, 0.0)
        );
        assert_eq!(
            slot_center(GRID_COLS) - first,
            Vec2::new(0.0, -(CARD_HEIGHT + SPACING))
        );
    }

    #[test]
    fn all_cards_fit_inside_the_window() {
        for slot in 0..CARD_COUNT {
            let center = slot_center(slot);
            assert!(center.x - CARD_WIDTH / 2.0 >= -WINDOW_WIDTH / 2.0);
            assert!(center.x + CARD_WIDTH / 2.0 <= WINDOW_WIDTH / 2.0);
            assert!(center.y + CARD_HEIGHT / 2.0 <= WINDOW_HEIGHT / 2.0);
            assert!(center.y - CARD_HEIGHT / 2.0 >= -WINDOW_HEIGHT / 2.0);
        }
    }

    fn click(states: &mut [CardState], slot: usize) {
        let opened = states.iter().filter(|s| s.opened).count();
        states[slot].click(opened < 2);
    }

    fn evaluate(values: &[&'static str], states: &mut [CardState], now: f32) -> Option<PairOutcome> {
        evaluate_board(
            values.iter().copied().zip(states.iter_mut()),
            now,
        )
    }

    #[test]
    fn clicking_a_matching_pair_obtains_both() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = deal(&mut rng);
        let mut states = vec![CardState::default(); CARD_COUNT];

        let a = 0;
        let b = (1..CARD_COUNT).find(|&i| values[i] == values[a]).unwrap();

        click(&mut states, a);
        assert_eq!(evaluate(&values, &mut states, 0.0), None);
        click(&mut states, b);
        assert_eq!(
            evaluate(&values, &mut states, 0.0),
            Some(PairOutcome::Matched)
        );

        assert!(states[a].obtained && states[b].obtained);
        assert_eq!(states.iter().filter(|s| s.obtained).count(), 2);
    }

    #[test]
    fn clicking_a_mismatched_pair_fails_then_auto_resets() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = deal(&mut rng);
        let mut states = vec![CardState::default(); CARD_COUNT];

        let a = 0;
        let c = (1..CARD_COUNT).find(|&i| values[i] != values[a]).unwrap();

        click(&mut states, a);
        click(&mut states, c);
        assert_eq!(
            evaluate(&values, &mut states, 5.0),
            Some(PairOutcome::Mismatched)
        );
        assert!(states[a].failed.is_some() && states[c].failed.is_some());
        assert_eq!(states[a].label(values[a], false), values[a]);

        // Still flashing red just before the timeout.
        for state in states.iter_mut() {
            state.clear_failed(5.0 + FAIL_TIMEOUT);
        }
        assert!(states[a].failed.is_some());

        for state in states.iter_mut() {
            state.clear_failed(5.0 + FAIL_TIMEOUT + 0.1);
        }
        assert_eq!(states[a], CardState::default());
        assert_eq!(states[c], CardState::default());
        assert_eq!(states[a].label(values[a], false), "???");
    }

    #[test]
    fn a_third_card_cannot_open_while_two_are_pending() {
        let values = ["nova", "comet", "nova", "comet"];
        let mut states = vec![CardState::default(); 4];

        click(&mut states, 0);
        click(&mut states, 1);
        click(&mut states, 2);
        assert!(!states[2].opened);
        assert_eq!(states.iter().filter(|s| s.opened).count(), 2);

        assert_eq!(
            evaluate(&values, &mut states, 0.0),
            Some(PairOutcome::Mismatched)
        );
    }
}
