//! Unit tests for the tick engine
//!
//! The engine is pure apart from the injected entropy source, so every tick
//! sequence here is fully reproducible.

use tickchain_types::{Band, TickIndex};

use crate::engine::{EngineParams, TickEngine};
use crate::entropy::{FixedDraw, RngEntropy, ScriptedDraws};
use crate::kernel::KernelParams;

// ============================================================================
// Test Helpers
// ============================================================================

fn time_at(second: u32) -> String {
    format!("2024-01-01T00:00:{second:02}Z")
}

/// (dt_ms, tick_ms, a_stress, draw) for the reference sequence.
const REFERENCE_TICKS: [(f64, f64, f64, f64); 4] = [
    (1000.0, 1000.0, 0.0, 0.5),
    (1100.0, 1000.0, 0.0, -0.25),
    (1600.0, 1000.0, 0.01, 1.0),
    (900.0, 1000.0, -0.05, -1.0),
];

const REFERENCE_ALIGNS: [&str; 4] = ["+0.025000000", "+0.013723544", "-0.024481354", "-0.024611994"];

const REFERENCE_STAMPS: [&str; 4] = [
    "2bbcf97b2d80bbcd2571e32701c464f7439e9678d8a4a938eca5a523d2ba1fcc",
    "9f01f781495bc83af834c16ea9327f39b0a9c5daccdb2a95e50b6f4259d72305",
    "7a63f5391c498022c71d8f55dd31bdf0edb354f0bbe20507e6ff90a4b72b3b1a",
    "5ad70490f434708ac95a05f3a9f2aaf72f07de91b61136eb750768ffb11f8762",
];

fn run_reference(engine: &mut TickEngine) {
    let mut draws = ScriptedDraws::new(REFERENCE_TICKS.map(|(_, _, _, draw)| draw));
    for (i, (dt_ms, tick_ms, a_stress, _)) in REFERENCE_TICKS.into_iter().enumerate() {
        engine.step(time_at(i as u32), dt_ms, tick_ms, a_stress, &mut draws);
    }
    assert_eq!(draws.consumed(), REFERENCE_TICKS.len());
}

// ============================================================================
// Single tick
// ============================================================================

#[test]
fn first_on_time_tick_without_noise() {
    let mut engine = TickEngine::default();
    let record = engine.step(time_at(0), 1000.0, 1000.0, 0.0, &mut FixedDraw::new(0.0));

    assert_eq!(record.tick_index, TickIndex::FIRST);
    assert_eq!(record.time_utc, "2024-01-01T00:00:00Z");
    assert_eq!(record.final_align, "+0.020000000");
    assert!((record.alignment - 0.02).abs() < 1e-12);
    assert_eq!(record.band, Band::C);
    assert_eq!(
        record.stamp.to_hex(),
        "a964bc2b9d788746f3b0cece8c12254cf909d384b0482ffbc932a04ebe01e96f"
    );
    assert_eq!(record.dt_ms, 1000.0);
    assert_eq!(record.tick_ms, 1000.0);
    assert_eq!(record.a_stress, 0.0);
}

#[test]
fn first_tick_kernel_state_holds_one_sample() {
    let mut engine = TickEngine::default();
    engine.step(time_at(0), 1000.0, 1000.0, 0.0, &mut FixedDraw::new(0.0));

    let state = engine.kernel_state();
    assert_eq!(state.w(), 1.0);
    assert!((state.u() - 0.020_002_667_306_849_582).abs() < 1e-15);
}

#[test]
fn non_finite_stress_is_recorded_as_zero() {
    let mut plain = TickEngine::default();
    let mut nan = TickEngine::default();

    let expected = plain
        .step(time_at(0), 1000.0, 1000.0, 0.0, &mut FixedDraw::new(0.0))
        .clone();
    let record = nan.step(time_at(0), 1000.0, 1000.0, f64::NAN, &mut FixedDraw::new(0.0));

    assert_eq!(record.a_stress, 0.0);
    assert_eq!(record.final_align, expected.final_align);
    assert_eq!(record.stamp, expected.stamp);
}

#[test]
fn degenerate_timing_is_handled_without_panicking() {
    let mut engine = TickEngine::default();
    let mut zero = FixedDraw::new(0.0);

    // Zero cadence: jitter and freeze are both disabled
    let record = engine.step(time_at(0), 1000.0, 0.0, 0.0, &mut zero);
    assert_eq!(record.final_align, "+0.020000000");

    // Zero and negative dt: no jitter contribution
    engine.step(time_at(1), 0.0, 1000.0, 0.0, &mut zero);
    let record = engine.step(time_at(2), -50.0, 1000.0, 0.0, &mut zero);
    assert_eq!(record.final_align, "+0.020000000");

    // Infinite dt: no jitter, but still counts as a freeze
    let record = engine.step(time_at(3), f64::INFINITY, 1000.0, 0.0, &mut zero);
    assert!(record.alignment.is_finite());
    assert!(record.alignment < 0.02);

    assert_eq!(engine.verify(), Ok(4));
}

#[test]
fn long_stall_lands_in_band_d() {
    let mut engine = TickEngine::default();
    // 10x cadence: jitter 9.0 plus freeze penalty
    let record = engine.step(time_at(0), 10_000.0, 1000.0, 0.0, &mut FixedDraw::new(0.0));
    assert_eq!(record.band, Band::D);
    assert!(record.alignment < -0.9);
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn reference_sequence_alignments_and_stamps() {
    let mut engine = TickEngine::default();
    run_reference(&mut engine);

    let records = engine.records();
    assert_eq!(records.len(), 4);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.tick_index, TickIndex::new(i as u64 + 1));
        assert_eq!(record.final_align, REFERENCE_ALIGNS[i], "tick {}", i + 1);
        assert_eq!(record.band, Band::C);
        assert_eq!(record.stamp.to_hex(), REFERENCE_STAMPS[i], "tick {}", i + 1);
    }

    assert_eq!(engine.tick_count(), 4);
    assert_eq!(engine.chain_head(), Some(&records[3].stamp));
    assert_eq!(engine.verify(), Ok(4));
}

#[test]
fn decay_of_one_gives_running_mean() {
    let params = EngineParams {
        kernel: KernelParams::new(1.0, 1.0),
        ..EngineParams::default()
    };
    let mut engine = TickEngine::new(params);
    // raw 0.03 then 0.01: the atanh-space mean sits just above 0.02
    let mut draws = ScriptedDraws::new([1.0, -1.0]);
    engine.step(time_at(0), 1000.0, 1000.0, 0.0, &mut draws);
    let record = engine.step(time_at(1), 1000.0, 1000.0, 0.0, &mut draws);

    assert!((record.alignment - 0.02).abs() < 1e-5);
    assert_eq!(engine.kernel_state().w(), 2.0);
}

#[test]
fn tick_indices_are_contiguous() {
    let mut engine = TickEngine::default();
    let mut entropy = RngEntropy::seeded(7);
    for second in 0..30 {
        engine.step(time_at(second), 1000.0, 1000.0, 0.0, &mut entropy);
    }

    for (i, record) in engine.records().iter().enumerate() {
        assert_eq!(record.tick_index.as_u64(), i as u64 + 1);
    }
    assert_eq!(engine.last().map(|r| r.tick_index), Some(TickIndex::new(30)));
}

#[test]
fn seeded_sessions_are_identical() {
    let run = |seed: u64| {
        let mut engine = TickEngine::default();
        let mut entropy = RngEntropy::seeded(seed);
        for second in 0..20 {
            let dt_ms = 950.0 + f64::from(second) * 10.0;
            engine.step(time_at(second), dt_ms, 1000.0, 0.01, &mut entropy);
        }
        engine.into_records()
    };

    assert_eq!(run(99), run(99));
    assert_ne!(run(99), run(100));
}

#[test]
fn each_step_takes_exactly_one_draw() {
    let mut engine = TickEngine::default();
    let mut draws = ScriptedDraws::new([0.0]);
    for second in 0..5 {
        engine.step(time_at(second), 1000.0, 1000.0, 0.0, &mut draws);
        assert_eq!(draws.consumed(), second as usize + 1);
    }
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn reset_returns_to_genesis() {
    let mut engine = TickEngine::default();
    run_reference(&mut engine);

    engine.reset();
    assert!(engine.records().is_empty());
    assert_eq!(engine.tick_count(), 0);
    assert!(engine.chain_head().is_none());
    assert!(engine.kernel_state().is_empty());

    run_reference(&mut engine);
    let stamps: Vec<String> = engine.records().iter().map(|r| r.stamp.to_hex()).collect();
    assert_eq!(stamps, REFERENCE_STAMPS);
}

// ============================================================================
// Verification
// ============================================================================

#[test]
fn tampered_record_fails_verification() {
    let mut engine = TickEngine::default();
    run_reference(&mut engine);

    let mut records = engine.into_records();
    records[2].final_align = "+0.500000000".to_string();

    let err = tickchain_crypto::verify_chain(&records).unwrap_err();
    assert_eq!(err.tick_index, TickIndex::new(3));
    assert_eq!(err.stored.to_hex(), REFERENCE_STAMPS[2]);
}

#[test]
fn empty_engine_verifies_zero() {
    assert_eq!(TickEngine::default().verify(), Ok(0));
}

// ============================================================================
// Construction
// ============================================================================

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "invalid kernel params")]
fn negative_weight_is_rejected_at_construction() {
    let _ = TickEngine::new(EngineParams {
        kernel: KernelParams::new(1.0, -1.0),
        ..EngineParams::default()
    });
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "invalid kernel params")]
fn zero_decay_is_rejected_at_construction() {
    let _ = TickEngine::new(EngineParams {
        kernel: KernelParams::new(0.0, 1.0),
        ..EngineParams::default()
    });
}
