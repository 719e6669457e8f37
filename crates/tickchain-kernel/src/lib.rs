//! # tickchain-kernel: Functional core of `tickchain`
//!
//! The kernel turns one measured tick interval into an alignment value, a
//! stability band, and a chained stamp.
//!
//! ## Key Principles
//!
//! - **No IO**: The kernel never touches disk, network, or the terminal
//! - **No clocks**: Elapsed time and timestamps are measured by the caller
//! - **Injected randomness**: The one noise draw per tick comes from an
//!   [`EntropySource`] passed in by the caller
//! - **Pure update**: `apply(state, raw, params) -> (state, a_out)`
//!
//! ## Architecture
//!
//! - [`entropy`]: The [`EntropySource`] seam and deterministic sources
//! - [`alignment`]: Raw alignment from jitter, freeze penalty, stress, noise
//! - [`kernel`]: Decayed accumulation in `atanh` space, mapped back by `tanh`
//! - [`band`]: Alignment → [`Band`](tickchain_types::Band)
//! - [`engine`]: [`TickEngine`], which owns all mutable per-session state
//!
//! ## Example
//!
//! ```
//! use tickchain_kernel::{FixedDraw, TickEngine};
//! use tickchain_types::Band;
//!
//! let mut engine = TickEngine::default();
//! let mut entropy = FixedDraw::new(0.0);
//!
//! let record = engine.step("2024-01-01T00:00:00Z", 1000.0, 1000.0, 0.0, &mut entropy);
//! assert_eq!(record.final_align, "+0.020000000");
//! assert_eq!(record.band, Band::C);
//! ```

pub mod alignment;
pub mod band;
pub mod engine;
pub mod entropy;
pub mod kernel;

#[cfg(test)]
mod tests;

pub use alignment::{AlignmentParams, AlignmentSource, TickSample};
pub use band::classify;
pub use engine::{EngineParams, TickEngine};
pub use entropy::{EntropySource, FixedDraw, RngEntropy, ScriptedDraws};
pub use kernel::{KernelParams, KernelState, apply};
