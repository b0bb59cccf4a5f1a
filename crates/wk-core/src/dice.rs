//! Five-die rolls with hold-and-reroll support.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Number of dice in every roll.
pub const DICE_PER_ROLL: usize = 5;

/// Roll a single six-sided die face from any RNG.
///
/// Maps a uniform `[0, 1)` float to `1..=6`, so the sequence is identical
/// to calling [`crate::GameRng::roll_die`] on the same generator state.
pub fn roll_face<R: RngCore + ?Sized>(rng: &mut R) -> u8 {
    let unit = f64::from(rng.next_u32()) / 4_294_967_296.0;
    1 + (unit * 6.0) as u8
}

/// An ordered roll of five dice, each in `1..=6`.
///
/// Rolls are ephemeral: a reroll produces a new value, leaving held dice
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceRoll {
    values: [u8; DICE_PER_ROLL],
}

impl DiceRoll {
    /// Roll five fresh dice.
    pub fn roll<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut values = [0u8; DICE_PER_ROLL];
        for v in &mut values {
            *v = roll_face(rng);
        }
        Self { values }
    }

    /// Reroll, regenerating only the dice not marked as held.
    pub fn reroll<R: RngCore + ?Sized>(&self, held: [bool; DICE_PER_ROLL], rng: &mut R) -> Self {
        let mut values = self.values;
        for (i, v) in values.iter_mut().enumerate() {
            if !held[i] {
                *v = roll_face(rng);
            }
        }
        Self { values }
    }

    /// Build a roll from explicit face values, validating the 1..=6 range.
    pub fn from_values(values: [u8; DICE_PER_ROLL]) -> CoreResult<Self> {
        for &v in &values {
            if !(1..=6).contains(&v) {
                return Err(CoreError::InvalidFace(v));
            }
        }
        Ok(Self { values })
    }

    /// Build a roll from a slice, validating length and face range.
    pub fn from_slice(values: &[u8]) -> CoreResult<Self> {
        let array: [u8; DICE_PER_ROLL] = values
            .try_into()
            .map_err(|_| CoreError::InvalidDiceCount(values.len()))?;
        Self::from_values(array)
    }

    /// The face values in roll order.
    pub fn values(&self) -> [u8; DICE_PER_ROLL] {
        self.values
    }

    /// Face value of the die at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.values.get(index).copied()
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let faces: Vec<String> = self.values.iter().map(u8::to_string).collect();
        write!(f, "[{}]", faces.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;

    #[test]
    fn roll_produces_valid_faces() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            let roll = DiceRoll::roll(&mut rng);
            for v in roll.values() {
                assert!((1..=6).contains(&v));
            }
        }
    }

    #[test]
    fn reroll_keeps_held_dice() {
        let mut rng = GameRng::new(7);
        let roll = DiceRoll::roll(&mut rng);
        let held = [true, false, true, false, true];
        let rerolled = roll.reroll(held, &mut rng);
        assert_eq!(roll.get(0), rerolled.get(0));
        assert_eq!(roll.get(2), rerolled.get(2));
        assert_eq!(roll.get(4), rerolled.get(4));
    }

    #[test]
    fn reroll_all_held_is_identity() {
        let mut rng = GameRng::new(3);
        let roll = DiceRoll::roll(&mut rng);
        assert_eq!(roll, roll.reroll([true; DICE_PER_ROLL], &mut rng));
    }

    #[test]
    fn from_values_rejects_bad_faces() {
        assert!(DiceRoll::from_values([1, 2, 3, 4, 7]).is_err());
        assert!(DiceRoll::from_values([0, 2, 3, 4, 5]).is_err());
        assert!(DiceRoll::from_values([1, 2, 3, 4, 5]).is_ok());
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(matches!(
            DiceRoll::from_slice(&[1, 2, 3]),
            Err(CoreError::InvalidDiceCount(3))
        ));
    }

    #[test]
    fn display() {
        let roll = DiceRoll::from_values([1, 2, 3, 4, 5]).unwrap();
        assert_eq!(roll.to_string(), "[1, 2, 3, 4, 5]");
    }

    #[test]
    fn roll_deterministic_with_seed() {
        let mut a = GameRng::new(99);
        let mut b = GameRng::new(99);
        assert_eq!(DiceRoll::roll(&mut a), DiceRoll::roll(&mut b));
    }
}
