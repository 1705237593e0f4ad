//! The dice-rolling tool offered to the AI Dungeon Master.
//!
//! The model calls this for skill checks and combat; the result goes
//! back to it as a function response so it can narrate the outcome.

use rand::Rng;
use thiserror::Error;

/// Error type for dice rolling.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("A die needs at least one side (got {0})")]
    InvalidSides(i64),
    #[error("At least one die must be rolled (got {0})")]
    InvalidCount(i64),
}

/// Roll `count` dice with `sides` sides and describe the result.
pub fn roll_dice(sides: i64, count: i64) -> Result<String, DiceError> {
    roll_dice_with_rng(sides, count, &mut rand::thread_rng())
}

/// Roll with a specific RNG (useful for testing).
pub fn roll_dice_with_rng<R: Rng>(
    sides: i64,
    count: i64,
    rng: &mut R,
) -> Result<String, DiceError> {
    if sides < 1 {
        return Err(DiceError::InvalidSides(sides));
    }
    if count < 1 {
        return Err(DiceError::InvalidCount(count));
    }

    tracing::debug!("Rolling {count}d{sides}...");

    let rolls: Vec<i64> = (0..count).map(|_| rng.gen_range(1..=sides)).collect();
    let total: i64 = rolls.iter().sum();

    // A descriptive sentence for the model to weave into its story.
    if count == 1 {
        Ok(format!("The die lands on: {total}."))
    } else {
        let rolls_str = rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        Ok(format!("The dice land on: {total} ({rolls_str})."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_single_roll_wording() {
        for _ in 0..100 {
            let result = roll_dice(20, 1).unwrap();
            assert!(result.starts_with("The die lands on: "));
            assert!(result.ends_with('.'));

            let total: i64 = result
                .trim_start_matches("The die lands on: ")
                .trim_end_matches('.')
                .parse()
                .unwrap();
            assert!((1..=20).contains(&total));
        }
    }

    #[test]
    fn test_multi_roll_lists_each_die() {
        for _ in 0..100 {
            let result = roll_dice(6, 3).unwrap();
            assert!(result.starts_with("The dice land on: "));

            let (total_str, rolls_str) = result
                .trim_start_matches("The dice land on: ")
                .trim_end_matches('.')
                .trim_end_matches(')')
                .split_once(" (")
                .unwrap();

            let rolls: Vec<i64> = rolls_str
                .split(" + ")
                .map(|r| r.parse().unwrap())
                .collect();
            assert_eq!(rolls.len(), 3);
            assert!(rolls.iter().all(|r| (1..=6).contains(r)));

            let total: i64 = total_str.parse().unwrap();
            assert_eq!(total, rolls.iter().sum::<i64>());
        }
    }

    #[test]
    fn test_one_sided_die() {
        assert_eq!(roll_dice(1, 1).unwrap(), "The die lands on: 1.");
        assert_eq!(roll_dice(1, 3).unwrap(), "The dice land on: 3 (1 + 1 + 1).");
    }

    #[test]
    fn test_deterministic_with_seeded_rng() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            roll_dice_with_rng(20, 2, &mut a).unwrap(),
            roll_dice_with_rng(20, 2, &mut b).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_sides() {
        assert!(matches!(roll_dice(0, 1), Err(DiceError::InvalidSides(0))));
        assert!(matches!(roll_dice(-4, 1), Err(DiceError::InvalidSides(-4))));
    }

    #[test]
    fn test_rejects_bad_count() {
        assert!(matches!(roll_dice(6, 0), Err(DiceError::InvalidCount(0))));
        assert!(matches!(roll_dice(6, -1), Err(DiceError::InvalidCount(-1))));
    }
}
