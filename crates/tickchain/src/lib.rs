//! # tickchain
//!
//! Tamper-evident clock cadence sessions.
//!
//! Every tick measures how far the clock strayed from its cadence, folds that
//! into a smoothed alignment in (−1, +1), classifies it into a band, and
//! appends a SHA-256 stamp that commits to the whole history so far.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Session                              │
//! │  ┌───────┐   ┌───────────┐   ┌────────┐   ┌──────┐   ┌───────┐  │
//! │  │ Clock │ → │ Alignment │ → │ Kernel │ → │ Band │ → │ Stamp │  │
//! │  │ (dt)  │   │  (raw)    │   │ (tanh) │   │      │   │ chain │  │
//! │  └───────┘   └───────────┘   └────────┘   └──────┘   └───────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tickchain::{RngEntropy, Session, SessionConfig, SystemClock};
//!
//! let mut session = Session::new(
//!     SessionConfig::default(),
//!     SystemClock::new(),
//!     RngEntropy::seeded(7),
//! );
//!
//! let record = session.tick();
//! assert_eq!(record.tick_index.as_u64(), 1);
//! assert_eq!(session.verify(), Ok(1));
//! ```
//!
//! # Modules
//!
//! - **Session layer**: [`Session`], [`Clock`] - measured ticks over the pure engine
//! - **Storage**: [`export`] writes CSV, [`import`] reads it back and verifies
//! - **Display**: sparkline glyphs and dt health

mod clock;
pub mod display;
mod error;
pub mod export;
pub mod import;
mod session;

// Session layer
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, MalformedRecordError, Result};
pub use session::{
    DEFAULT_TICK_MS, MIN_TICK_MS, STRESS_LIMIT, Session, SessionConfig, clamp_stress,
    clamp_tick_ms,
};

// Storage
pub use export::{DEFAULT_BASENAME, export_file_name, export_records};
pub use import::{read_file, read_records, verify_file, verify_records};

// Display
pub use display::{DtHealth, HISTORY_LEN, sparkline};

// Re-export core types
pub use tickchain_types::{Band, Stamp, StoredRecord, TickIndex, TickRecord};

// Re-export the chain
pub use tickchain_crypto::{ChainIntegrityError, ChainVerifier, StampChain, verify_chain};

// Re-export the kernel
pub use tickchain_kernel::{
    AlignmentParams, EngineParams, EntropySource, FixedDraw, KernelParams, RngEntropy,
    ScriptedDraws, TickEngine,
};
