//! Per-session orchestration.
//!
//! [`TickEngine`] owns every piece of mutable session state: the kernel
//! accumulator, the stamp chain, the next tick index, and the records
//! produced so far. One call to [`TickEngine::step`] is one tick.

use tickchain_crypto::{ChainIntegrityError, StampChain, verify_chain};
use tickchain_types::{Stamp, TickIndex, TickRecord, format_alignment};

use crate::alignment::{AlignmentParams, AlignmentSource, TickSample};
use crate::band::classify;
use crate::entropy::EntropySource;
use crate::kernel::{KernelParams, KernelState, apply};

/// Parameters fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineParams {
    pub alignment: AlignmentParams,
    pub kernel: KernelParams,
}

/// Deterministic tick pipeline: alignment → kernel → band → stamp.
#[derive(Debug, Clone)]
pub struct TickEngine {
    source: AlignmentSource,
    kernel_params: KernelParams,
    kernel: KernelState,
    chain: StampChain,
    next_index: TickIndex,
    records: Vec<TickRecord>,
}

impl Default for TickEngine {
    fn default() -> Self {
        Self::new(EngineParams::default())
    }
}

impl TickEngine {
    pub fn new(params: EngineParams) -> Self {
        // Precondition: kernel params keep the weight denominator positive
        debug_assert!(
            params.kernel.is_valid(),
            "invalid kernel params: {:?}",
            params.kernel
        );

        Self {
            source: AlignmentSource::new(params.alignment),
            kernel_params: params.kernel,
            kernel: KernelState::new(),
            chain: StampChain::new(),
            next_index: TickIndex::FIRST,
            records: Vec::new(),
        }
    }

    pub fn params(&self) -> EngineParams {
        EngineParams {
            alignment: *self.source.params(),
            kernel: self.kernel_params,
        }
    }

    /// Runs one tick and appends its record.
    ///
    /// `time_utc` is the caller's timestamp text for this tick and is stored
    /// verbatim. A non-finite `a_stress` is treated and recorded as 0.
    /// Exactly one draw is taken from `entropy`.
    pub fn step<E: EntropySource + ?Sized>(
        &mut self,
        time_utc: impl Into<String>,
        dt_ms: f64,
        tick_ms: f64,
        a_stress: f64,
        entropy: &mut E,
    ) -> &TickRecord {
        let time_utc = time_utc.into();
        let a_stress = if a_stress.is_finite() { a_stress } else { 0.0 };

        let raw = self
            .source
            .sample(TickSample::new(dt_ms, tick_ms, a_stress), entropy);
        let (kernel, alignment) = apply(self.kernel, raw, &self.kernel_params);
        self.kernel = kernel;

        let band = classify(alignment);
        let final_align = format_alignment(alignment);
        let stamp = self.chain.append(&time_utc, &final_align, band.as_str());

        let tick_index = self.next_index;
        self.next_index = tick_index.next();

        self.records.push(TickRecord {
            tick_index,
            time_utc,
            final_align,
            alignment,
            band,
            stamp,
            tick_ms,
            dt_ms,
            a_stress,
        });

        // Postcondition: one record per chain link, indices contiguous from 1
        debug_assert_eq!(self.records.len() as u64, self.chain.len());
        debug_assert_eq!(tick_index.as_u64(), self.chain.len());

        &self.records[self.records.len() - 1]
    }

    /// Clears kernel state, chain, index, and records.
    ///
    /// The next tick after a reset is tick 1 with a genesis stamp.
    pub fn reset(&mut self) {
        self.kernel = KernelState::new();
        self.chain.reset();
        self.next_index = TickIndex::FIRST;
        self.records.clear();
    }

    /// All records since creation or the last reset, in tick order.
    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TickRecord> {
        self.records.last()
    }

    pub fn tick_count(&self) -> u64 {
        self.chain.len()
    }

    pub fn kernel_state(&self) -> KernelState {
        self.kernel
    }

    pub fn chain_head(&self) -> Option<&Stamp> {
        self.chain.head()
    }

    /// Replays the chain over this engine's own records.
    pub fn verify(&self) -> Result<usize, ChainIntegrityError> {
        verify_chain(&self.records)
    }

    /// Consumes the engine and hands back its records.
    pub fn into_records(self) -> Vec<TickRecord> {
        self.records
    }
}
