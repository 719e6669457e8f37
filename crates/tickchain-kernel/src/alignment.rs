//! Raw alignment from tick timing.
//!
//! The raw signal is unbounded (typically within about ±0.2) and is built
//! from four parts:
//!
//! ```text
//! jitter = (dt_ms - tick_ms) / max(tick_ms, 1)       0 if either input is ≤ 0 or non-finite
//! base   = BASELINE_A + a_stress - [FREEZE_PENALTY if dt_ms > FREEZE_MULT * tick_ms]
//! raw    = base - JITTER_GAIN * jitter + NOISE_AMPL * draw
//! ```
//!
//! Late ticks push alignment down, early ticks push it up, and a stalled
//! tick source takes a hard penalty.

use crate::entropy::EntropySource;

/// Baseline stability.
pub const BASELINE_A: f64 = 0.02;
/// How strongly jitter moves alignment.
pub const JITTER_GAIN: f64 = 0.15;
/// `dt_ms > FREEZE_MULT * tick_ms` counts as a freeze.
pub const FREEZE_MULT: f64 = 1.5;
/// Penalty subtracted from the baseline on a freeze.
pub const FREEZE_PENALTY: f64 = 0.05;
/// Amplitude of the uniform micro-noise term.
pub const NOISE_AMPL: f64 = 0.01;

/// Tuning constants of the alignment source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentParams {
    pub baseline: f64,
    pub jitter_gain: f64,
    pub freeze_mult: f64,
    pub freeze_penalty: f64,
    pub noise_ampl: f64,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            baseline: BASELINE_A,
            jitter_gain: JITTER_GAIN,
            freeze_mult: FREEZE_MULT,
            freeze_penalty: FREEZE_PENALTY,
            noise_ampl: NOISE_AMPL,
        }
    }
}

/// Timing inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    /// Measured time since the previous tick.
    pub dt_ms: f64,
    /// Configured cadence.
    pub tick_ms: f64,
    /// External stress offset added to the baseline.
    pub a_stress: f64,
}

impl TickSample {
    pub fn new(dt_ms: f64, tick_ms: f64, a_stress: f64) -> Self {
        Self {
            dt_ms,
            tick_ms,
            a_stress,
        }
    }
}

/// Relative deviation of `dt_ms` from `tick_ms`.
///
/// Falls back to 0 instead of dividing by zero or propagating NaN.
pub fn jitter(dt_ms: f64, tick_ms: f64) -> f64 {
    if !dt_ms.is_finite() || !tick_ms.is_finite() || dt_ms <= 0.0 || tick_ms <= 0.0 {
        return 0.0;
    }
    (dt_ms - tick_ms) / tick_ms.max(1.0)
}

/// Returns true if `dt_ms` is long enough to count as a stalled tick source.
pub fn is_frozen(dt_ms: f64, tick_ms: f64, freeze_mult: f64) -> bool {
    tick_ms > 0.0 && dt_ms > freeze_mult * tick_ms
}

/// Computes the raw alignment for a given draw.
///
/// A draw outside `[-1, 1]` is clamped; a non-finite draw counts as 0.
pub fn raw_alignment(params: &AlignmentParams, sample: TickSample, draw: f64) -> f64 {
    let draw = if draw.is_finite() {
        draw.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let mut base = params.baseline + sample.a_stress;
    let jitter_term = -params.jitter_gain * jitter(sample.dt_ms, sample.tick_ms);

    if is_frozen(sample.dt_ms, sample.tick_ms, params.freeze_mult) {
        base -= params.freeze_penalty;
    }

    let noise_term = params.noise_ampl * draw;

    base + jitter_term + noise_term
}

/// Alignment source: one raw scalar per tick, consuming exactly one draw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlignmentSource {
    params: AlignmentParams,
}

impl AlignmentSource {
    pub fn new(params: AlignmentParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AlignmentParams {
        &self.params
    }

    /// Samples the raw alignment for one tick.
    pub fn sample<E: EntropySource + ?Sized>(&self, sample: TickSample, entropy: &mut E) -> f64 {
        let draw = entropy.draw();
        raw_alignment(&self.params, sample, draw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{FixedDraw, ScriptedDraws};
    use proptest::prelude::*;
    use test_case::test_case;

    const EPS: f64 = 1e-12;

    #[test_case(1000.0, 1000.0, 0.0 ; "on time")]
    #[test_case(1100.0, 1000.0, 0.1 ; "late")]
    #[test_case(900.0, 1000.0, -0.1 ; "early")]
    #[test_case(0.0, 1000.0, 0.0 ; "zero dt")]
    #[test_case(-5.0, 1000.0, 0.0 ; "negative dt")]
    #[test_case(1000.0, 0.0, 0.0 ; "zero cadence")]
    #[test_case(1000.0, -1.0, 0.0 ; "negative cadence")]
    #[test_case(f64::NAN, 1000.0, 0.0 ; "nan dt")]
    #[test_case(f64::INFINITY, 1000.0, 0.0 ; "infinite dt")]
    #[test_case(1000.0, f64::INFINITY, 0.0 ; "infinite cadence")]
    #[test_case(1.0, 0.5, 0.5 ; "sub millisecond cadence divides by one")]
    fn jitter_cases(dt_ms: f64, tick_ms: f64, expected: f64) {
        assert!((jitter(dt_ms, tick_ms) - expected).abs() < EPS);
    }

    #[test]
    fn on_time_tick_with_zero_draw_is_baseline() {
        let raw = raw_alignment(
            &AlignmentParams::default(),
            TickSample::new(1000.0, 1000.0, 0.0),
            0.0,
        );
        assert!((raw - 0.02).abs() < EPS);
    }

    #[test]
    fn late_tick_lowers_alignment() {
        let params = AlignmentParams::default();
        let on_time = raw_alignment(&params, TickSample::new(1000.0, 1000.0, 0.0), 0.0);
        let late = raw_alignment(&params, TickSample::new(1100.0, 1000.0, 0.0), 0.0);
        assert!((late - (on_time - 0.015)).abs() < EPS);
    }

    #[test]
    fn early_tick_raises_alignment() {
        let params = AlignmentParams::default();
        let on_time = raw_alignment(&params, TickSample::new(1000.0, 1000.0, 0.0), 0.0);
        let early = raw_alignment(&params, TickSample::new(900.0, 1000.0, 0.0), 0.0);
        assert!(early > on_time);
    }

    #[test]
    fn freeze_penalty_applies_only_past_threshold() {
        let params = AlignmentParams::default();
        let at_threshold = raw_alignment(&params, TickSample::new(1500.0, 1000.0, 0.0), 0.0);
        let past = raw_alignment(&params, TickSample::new(1600.0, 1000.0, 0.0), 0.0);

        // 1500 ms: jitter 0.5 only
        assert!((at_threshold - (0.02 - 0.075)).abs() < EPS);
        // 1600 ms: jitter 0.6 plus the freeze penalty
        assert!((past - (0.02 - 0.05 - 0.09)).abs() < EPS);
    }

    #[test]
    fn stress_shifts_baseline() {
        let raw = raw_alignment(
            &AlignmentParams::default(),
            TickSample::new(1000.0, 1000.0, 0.05),
            0.0,
        );
        assert!((raw - 0.07).abs() < EPS);
    }

    #[test_case(1.0, 0.03 ; "max draw")]
    #[test_case(-1.0, 0.01 ; "min draw")]
    #[test_case(7.0, 0.03 ; "clamped high")]
    #[test_case(-7.0, 0.01 ; "clamped low")]
    #[test_case(f64::NAN, 0.02 ; "nan draw")]
    fn noise_term_is_bounded(draw: f64, expected: f64) {
        let raw = raw_alignment(
            &AlignmentParams::default(),
            TickSample::new(1000.0, 1000.0, 0.0),
            draw,
        );
        assert!((raw - expected).abs() < EPS);
    }

    #[test]
    fn sample_consumes_exactly_one_draw() {
        let source = AlignmentSource::default();
        let mut draws = ScriptedDraws::new([1.0, -1.0]);

        let first = source.sample(TickSample::new(1000.0, 1000.0, 0.0), &mut draws);
        assert_eq!(draws.consumed(), 1);
        let second = source.sample(TickSample::new(1000.0, 1000.0, 0.0), &mut draws);
        assert_eq!(draws.consumed(), 2);

        assert!((first - 0.03).abs() < EPS);
        assert!((second - 0.01).abs() < EPS);
    }

    #[test]
    fn sample_matches_reference_sequence() {
        let source = AlignmentSource::default();
        let mut draws = ScriptedDraws::new([0.5, -0.25, 1.0, -1.0]);
        let samples = [
            TickSample::new(1000.0, 1000.0, 0.0),
            TickSample::new(1100.0, 1000.0, 0.0),
            TickSample::new(1600.0, 1000.0, 0.01),
            TickSample::new(900.0, 1000.0, -0.05),
        ];
        let expected = [0.025, 0.0025, -0.1, -0.025];

        for (sample, want) in samples.into_iter().zip(expected) {
            let raw = source.sample(sample, &mut draws);
            assert!((raw - want).abs() < EPS, "raw {raw} != {want}");
        }
    }

    proptest! {
        #[test]
        fn prop_raw_is_finite_for_any_timing(
            dt_ms in prop::num::f64::ANY,
            tick_ms in prop::num::f64::ANY,
            draw in -1.0f64..=1.0,
        ) {
            let raw = raw_alignment(
                &AlignmentParams::default(),
                TickSample::new(dt_ms, tick_ms, 0.0),
                draw,
            );
            prop_assert!(raw.is_finite());
        }

        #[test]
        fn prop_fixed_draw_is_deterministic(dt_ms in 1.0f64..5000.0, draw in -1.0f64..=1.0) {
            let source = AlignmentSource::default();
            let sample = TickSample::new(dt_ms, 1000.0, 0.0);
            let a = source.sample(sample, &mut FixedDraw::new(draw));
            let b = source.sample(sample, &mut FixedDraw::new(draw));
            prop_assert_eq!(a, b);
        }
    }
}
