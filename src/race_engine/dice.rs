//! Dice - Random source driving mover selection, turn length and stunts
//!
//! `RandomDice` wraps any `rand::Rng`; seed it for reproducible races, or
//! implement `RaceDice` by hand to script a race turn by turn.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RaceDice {
    /// Index of the vehicle moving this turn, in `0..count`.
    fn pick_mover(&mut self, count: usize) -> usize;

    /// Distance requested for a turn, in `[10.00, 200.00]` on a 0.01 grid.
    fn turn_distance(&mut self) -> f64;

    /// Whether a stunt attempt succeeds (even odds).
    fn stunt_roll(&mut self) -> bool;
}

/// Turn distances are drawn in hundredths of a distance unit.
pub const MIN_TURN_HUNDREDTHS: u32 = 1000;
pub const MAX_TURN_HUNDREDTHS: u32 = 20000;

/// Dice backed by a `rand` generator
#[derive(Debug, Clone)]
pub struct RandomDice<R = StdRng> {
    rng: R,
}

impl RandomDice<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RaceDice for RandomDice<R> {
    fn pick_mover(&mut self, count: usize) -> usize {
        self.rng.gen_range(0..count)
    }

    fn turn_distance(&mut self) -> f64 {
        self.rng.gen_range(MIN_TURN_HUNDREDTHS..=MAX_TURN_HUNDREDTHS) as f64 / 100.0
    }

    fn stunt_roll(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}
