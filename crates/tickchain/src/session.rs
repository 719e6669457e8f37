//! Live sessions: the imperative shell around [`TickEngine`].
//!
//! A [`Session`] reads its [`Clock`] to measure `dt_ms` and format `time_utc`,
//! then hands both to the pure engine. It also keeps the short alignment
//! history used for the sparkline and owns the stress offset.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tickchain_crypto::ChainIntegrityError;
use tickchain_kernel::{EngineParams, EntropySource, TickEngine};
use tickchain_types::{TickRecord, format_time_utc};

use crate::clock::Clock;
use crate::display::{DtHealth, HISTORY_LEN, sparkline};
use crate::error::Result;
use crate::export::export_records;

/// Stress offsets are clamped to `[-STRESS_LIMIT, STRESS_LIMIT]`.
pub const STRESS_LIMIT: f64 = 0.05;

/// Shortest accepted cadence (1 ms).
pub const MIN_TICK_MS: f64 = 1.0;

/// Default cadence.
pub const DEFAULT_TICK_MS: f64 = 1000.0;

/// Session settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Cadence in milliseconds, floored at [`MIN_TICK_MS`].
    pub tick_ms: f64,
    /// Initial stress offset.
    pub a_stress: f64,
    /// Stop after this many ticks. 0 means no limit.
    pub max_ticks: u64,
    /// Number of alignments kept for the sparkline.
    pub history_len: usize,
    pub engine: EngineParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            a_stress: 0.0,
            max_ticks: 0,
            history_len: HISTORY_LEN,
            engine: EngineParams::default(),
        }
    }
}

impl SessionConfig {
    /// Sets the cadence from seconds.
    pub fn with_tick_sec(mut self, tick_sec: f64) -> Self {
        self.tick_ms = tick_sec * 1000.0;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_stress(mut self, a_stress: f64) -> Self {
        self.a_stress = a_stress;
        self
    }
}

/// Clamps a stress offset into the accepted range. Non-finite input is 0.
pub fn clamp_stress(a_stress: f64) -> f64 {
    if a_stress.is_finite() {
        a_stress.clamp(-STRESS_LIMIT, STRESS_LIMIT)
    } else {
        0.0
    }
}

/// Floors a cadence at [`MIN_TICK_MS`]. Non-finite input is the default.
pub fn clamp_tick_ms(tick_ms: f64) -> f64 {
    if tick_ms.is_finite() {
        tick_ms.max(MIN_TICK_MS)
    } else {
        DEFAULT_TICK_MS
    }
}

/// One running session.
#[derive(Debug)]
pub struct Session<C, E> {
    engine: TickEngine,
    clock: C,
    entropy: E,
    tick_ms: f64,
    a_stress: f64,
    max_ticks: u64,
    history_len: usize,
    history: VecDeque<f64>,
    last_monotonic_ms: Option<f64>,
}

impl<C: Clock, E: EntropySource> Session<C, E> {
    pub fn new(config: SessionConfig, clock: C, entropy: E) -> Self {
        let tick_ms = clamp_tick_ms(config.tick_ms);
        if tick_ms != config.tick_ms {
            tracing::warn!(requested = config.tick_ms, tick_ms, "cadence adjusted");
        }

        let mut session = Self {
            engine: TickEngine::new(config.engine),
            clock,
            entropy,
            tick_ms,
            a_stress: 0.0,
            max_ticks: config.max_ticks,
            history_len: config.history_len,
            history: VecDeque::with_capacity(config.history_len),
            last_monotonic_ms: None,
        };
        session.set_stress(config.a_stress);
        session
    }

    /// Runs one tick.
    ///
    /// `dt_ms` is the monotonic time since the previous tick; the first tick
    /// of a session (or after a reset) uses the cadence instead.
    pub fn tick(&mut self) -> &TickRecord {
        let now_ms = self.clock.monotonic_ms();
        let dt_ms = match self.last_monotonic_ms {
            Some(last) => now_ms - last,
            None => self.tick_ms,
        };
        self.last_monotonic_ms = Some(now_ms);

        let time_utc = format_time_utc(self.clock.now_utc());

        let record = self.engine.step(
            time_utc,
            dt_ms,
            self.tick_ms,
            self.a_stress,
            &mut self.entropy,
        );

        if self.history_len > 0 {
            if self.history.len() == self.history_len {
                self.history.pop_front();
            }
            self.history.push_back(record.alignment);
        }

        tracing::debug!(
            tick_index = %record.tick_index,
            final_align = %record.final_align,
            band = %record.band,
            dt_ms,
            "tick"
        );

        record
    }

    /// Returns true once `max_ticks` ticks have run. Never true without a limit.
    pub fn is_finished(&self) -> bool {
        self.max_ticks > 0 && self.engine.tick_count() >= self.max_ticks
    }

    /// Sets the stress offset used from the next tick on, clamped to
    /// `[-STRESS_LIMIT, STRESS_LIMIT]`. Returns the value applied.
    pub fn set_stress(&mut self, a_stress: f64) -> f64 {
        let applied = clamp_stress(a_stress);
        if applied != a_stress {
            tracing::warn!(requested = a_stress, applied, "stress offset clamped");
        }
        self.a_stress = applied;
        applied
    }

    pub fn stress(&self) -> f64 {
        self.a_stress
    }

    pub fn tick_ms(&self) -> f64 {
        self.tick_ms
    }

    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    pub fn params(&self) -> EngineParams {
        self.engine.params()
    }

    pub fn records(&self) -> &[TickRecord] {
        self.engine.records()
    }

    pub fn last(&self) -> Option<&TickRecord> {
        self.engine.last()
    }

    pub fn tick_count(&self) -> u64 {
        self.engine.tick_count()
    }

    /// Sparkline of the recent alignments, oldest first.
    pub fn sparkline(&self) -> String {
        sparkline(self.history.iter().copied())
    }

    /// Health of the most recent interval, or `Unknown` before the first tick.
    pub fn dt_health(&self) -> DtHealth {
        match self.engine.last() {
            Some(record) => DtHealth::classify(record.dt_ms, record.tick_ms),
            None => DtHealth::Unknown,
        }
    }

    /// Replays the chain over this session's records.
    pub fn verify(&self) -> std::result::Result<usize, ChainIntegrityError> {
        let result = self.engine.verify();
        match &result {
            Ok(count) => tracing::info!(count, "in-memory chain verified"),
            Err(e) => tracing::warn!(tick_index = %e.tick_index, "in-memory chain mismatch"),
        }
        result
    }

    /// Writes all records to `<directory>/<basename>_<now>.csv`.
    ///
    /// Records are kept on failure; the session can keep ticking.
    pub fn export(&self, directory: &Path, basename: &str) -> Result<PathBuf> {
        export_records(directory, basename, self.clock.now_utc(), self.records())
    }

    /// Starts over: tick 1, genesis stamp, empty history.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.history.clear();
        self.last_monotonic_ms = None;
        tracing::info!("session reset");
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Consumes the session and hands back its records.
    pub fn into_records(self) -> Vec<TickRecord> {
        self.engine.into_records()
    }
}
