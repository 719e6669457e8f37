//! Entropy sources for the per-tick noise draw.
//!
//! The kernel never reaches for a global RNG. Callers hand in an
//! [`EntropySource`]; live sessions use [`RngEntropy`] and tests use
//! [`FixedDraw`] or [`ScriptedDraws`] to pin the noise sequence.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Supplies uniform draws in `[-1.0, 1.0]`.
pub trait EntropySource {
    /// Returns the next draw. Called exactly once per tick.
    fn draw(&mut self) -> f64;
}

impl<E: EntropySource + ?Sized> EntropySource for &mut E {
    fn draw(&mut self) -> f64 {
        (**self).draw()
    }
}

/// Uniform draws backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngEntropy<R> {
    rng: R,
}

impl<R: RngCore> RngEntropy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns the underlying generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngEntropy<StdRng> {
    /// Reproducible draws: the same seed yields the same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Draws seeded from the operating system.
    pub fn from_os() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: RngCore> EntropySource for RngEntropy<R> {
    fn draw(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

/// Returns the same draw forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraw(f64);

impl FixedDraw {
    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl EntropySource for FixedDraw {
    fn draw(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed list of draws in order, cycling when exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    consumed: usize,
}

impl ScriptedDraws {
    /// # Panics
    ///
    /// Panics if `draws` is empty.
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        let draws = draws.into();
        assert!(!draws.is_empty(), "scripted draws must not be empty");
        Self { draws, consumed: 0 }
    }

    /// Number of draws taken so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl EntropySource for ScriptedDraws {
    fn draw(&mut self) -> f64 {
        let value = self.draws[self.consumed % self.draws.len()];
        self.consumed += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scripted_draws_cycle_in_order() {
        let mut draws = ScriptedDraws::new([0.5, -0.5]);
        let taken: Vec<f64> = (0..5).map(|_| draws.draw()).collect();
        assert_eq!(taken, [0.5, -0.5, 0.5, -0.5, 0.5]);
        assert_eq!(draws.consumed(), 5);
    }

    #[test]
    #[should_panic(expected = "scripted draws must not be empty")]
    fn scripted_draws_reject_empty_script() {
        let _ = ScriptedDraws::new(Vec::new());
    }

    #[test]
    fn fixed_draw_never_changes() {
        let mut draw = FixedDraw::new(0.25);
        assert_eq!(draw.draw(), 0.25);
        assert_eq!(draw.draw(), 0.25);
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = RngEntropy::seeded(42);
        let mut b = RngEntropy::seeded(42);
        for _ in 0..32 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn mutable_reference_is_a_source() {
        fn take_two(mut source: impl EntropySource) -> (f64, f64) {
            (source.draw(), source.draw())
        }

        let mut draws = ScriptedDraws::new([0.1, 0.2]);
        assert_eq!(take_two(&mut draws), (0.1, 0.2));
        assert_eq!(draws.consumed(), 2);
    }

    proptest! {
        #[test]
        fn prop_rng_draws_stay_in_unit_interval(seed in any::<u64>()) {
            let mut source = RngEntropy::seeded(seed);
            for _ in 0..64 {
                let value = source.draw();
                prop_assert!((-1.0..=1.0).contains(&value));
            }
        }
    }
}
