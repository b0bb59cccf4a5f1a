//! Seeded pseudo-random generator for replayable games.
//!
//! Every die roll in a game derives from one [`GameRng`], so a whole match
//! can be replayed from its seed. The generator is a mulberry32-style
//! 32-bit mix: fast, order-sensitive, and deterministic. It is not
//! cryptographic and is not meant to be.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

/// A deterministic 32-bit mix generator.
///
/// Two instances constructed with the same seed produce identical output
/// sequences for any length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRng {
    state: u32,
}

impl GameRng {
    /// Create a generator from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Create a generator from a possibly messy floating-point seed.
    ///
    /// Non-finite seeds fall back to the current time in milliseconds;
    /// everything else is truncated and coerced to unsigned 32-bit
    /// (two's complement, matching a `>>> 0` coercion).
    pub fn from_seed_f64(seed: f64) -> Self {
        let normalized = if seed.is_finite() {
            seed.trunc() as i64 as u32
        } else {
            now_millis() as u32
        };
        Self::new(normalized)
    }

    /// Next uniform float in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Roll a single six-sided die: `1 + floor(unit * 6)`.
    pub fn roll_die(&mut self) -> u8 {
        crate::dice::roll_face(self)
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let word = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}

/// Milliseconds since the Unix epoch, for seed fallback only.
fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
