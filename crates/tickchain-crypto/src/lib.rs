//! # tickchain-crypto: Stamp chain for `tickchain`
//!
//! Every tick result is committed to a SHA-256 hash chain. Each stamp
//! depends on the previous stamp, so editing any recorded tick breaks every
//! stamp from that tick onward.
//!
//! The chain gives tamper *evidence*, not tamper *prevention*: anyone holding
//! the records can recompute a consistent chain from scratch.
//!
//! ## Modules
//!
//! - [`stamp`]: the stamp construction for a single link
//! - [`chain`]: chain state, the [`ChainLink`] view, and replay verification

pub mod chain;
pub mod stamp;

pub use chain::{ChainIntegrityError, ChainLink, ChainVerifier, StampChain, verify_chain};
pub use stamp::{make_stamp, sha256, stamp_payload};
