//! Stamp construction for a single chain link.
//!
//! ```text
//! payload = time_utc "|" final_align "|" band
//! stamp   = SHA256( prev_hex ++ hex(SHA256(payload)) ++ time_utc )
//! ```
//!
//! `prev_hex` is the previous stamp's lowercase hex text, or nothing for the
//! first link. The inner digest enters the outer hash as lowercase hex
//! *text* (64 bytes), not as its 32 raw bytes. Existing chains depend on this
//! exact byte layout.

use sha2::{Digest, Sha256};
use tickchain_types::{STAMP_LENGTH, Stamp};

/// Builds the payload string a stamp commits to.
pub fn stamp_payload(time_utc: &str, final_align: &str, band: &str) -> String {
    format!("{time_utc}|{final_align}|{band}")
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; STAMP_LENGTH] {
    Sha256::digest(data).into()
}

/// Computes the stamp for one link.
///
/// # Arguments
/// - `prev`: previous stamp in the chain (`None` for the first tick)
/// - `payload`: see [`stamp_payload`]
/// - `time_utc`: the tick's timestamp, hashed a second time after the payload
pub fn make_stamp(prev: Option<&Stamp>, payload: &str, time_utc: &str) -> Stamp {
    let payload_hex = hex::encode(sha256(payload.as_bytes()));

    let mut hasher = Sha256::new();
    if let Some(prev) = prev {
        hasher.update(prev.to_hex().as_bytes());
    }
    hasher.update(payload_hex.as_bytes());
    hasher.update(time_utc.as_bytes());
    let result: [u8; STAMP_LENGTH] = hasher.finalize().into();

    Stamp::from_bytes(result)
}
