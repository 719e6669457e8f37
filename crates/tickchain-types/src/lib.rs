//! # tickchain-types: Core types for `tickchain`
//!
//! This crate contains shared types used across the `tickchain` system:
//! - Tick identity ([`TickIndex`])
//! - Chain digests ([`Stamp`])
//! - Stability bands ([`Band`])
//! - Tick results ([`TickRecord`]) and their read-back view ([`StoredRecord`])
//! - Canonical text forms for timestamps and alignment values

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use thiserror::Error;

// ============================================================================
// Tick Index - Copy (cheap 8-byte value)
// ============================================================================

/// Position of a tick within a session.
///
/// Tick indexes are one-based and strictly increasing by one. The first
/// tick of a session has index 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickIndex(u64);

impl TickIndex {
    /// Index of the first tick in a session.
    pub const FIRST: TickIndex = TickIndex(1);

    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the index of the following tick.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for TickIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<TickIndex> for u64 {
    fn from(index: TickIndex) -> Self {
        index.0
    }
}

// ============================================================================
// Stamp - Copy (fixed 32-byte value)
// ============================================================================

/// Length of a stamp digest in bytes (SHA-256).
pub const STAMP_LENGTH: usize = 32;

/// Length of a stamp in its canonical text form (lowercase hex).
pub const STAMP_HEX_LENGTH: usize = STAMP_LENGTH * 2;

/// A 32-byte SHA-256 digest committing one tick to the chain of all prior
/// ticks.
///
/// The canonical text form is 64 lowercase hex characters. That text, not the
/// raw bytes, is what the next link in the chain hashes over.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp([u8; STAMP_LENGTH]);

impl Stamp {
    /// Creates a stamp from raw digest bytes.
    pub fn from_bytes(bytes: [u8; STAMP_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the stamp as a byte slice.
    pub fn as_bytes(&self) -> &[u8; STAMP_LENGTH] {
        &self.0
    }

    /// Returns the canonical lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the canonical text form.
    ///
    /// Only exactly 64 lowercase hex characters are accepted, so that the
    /// parsed stamp re-encodes to the identical text.
    pub fn from_hex(text: &str) -> Result<Self, StampParseError> {
        if text.len() != STAMP_HEX_LENGTH {
            return Err(StampParseError::Length(text.len()));
        }
        if let Some(bad) = text
            .chars()
            .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
        {
            return Err(StampParseError::InvalidCharacter(bad));
        }

        let mut bytes = [0u8; STAMP_LENGTH];
        hex::decode_to_slice(text, &mut bytes)
            .map_err(|e| StampParseError::Decode(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Debug for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 8 bytes are enough to tell stamps apart in logs
        write!(f, "Stamp({}...)", hex::encode(&self.0[..8]))
    }
}

impl Display for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Stamp {
    type Err = StampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; STAMP_LENGTH]> for Stamp {
    fn from(bytes: [u8; STAMP_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Stamp {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Error returned when stamp text is not in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StampParseError {
    #[error("expected {STAMP_HEX_LENGTH} hex characters, got {0}")]
    Length(usize),

    #[error("invalid stamp character {0:?} (lowercase hex only)")]
    InvalidCharacter(char),

    #[error("hex decode failed: {0}")]
    Decode(String),
}

// ============================================================================
// Band - stability category
// ============================================================================

/// Discrete stability category derived from an alignment value.
///
/// Bands are ordered from most aligned ([`Band::APlus`]) to least
/// ([`Band::D`]). Their text labels are part of the stamp payload, so the
/// labels must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    /// `a ≥ 0.80`
    APlus,
    /// `0.40 ≤ a < 0.80`
    A,
    /// `0.10 ≤ a < 0.40`
    B,
    /// `−0.10 ≤ a < 0.10`, the calm band around zero
    C,
    /// `a < −0.10`
    D,
}

impl Band {
    /// All bands, highest first.
    pub const ALL: [Band; 5] = [Band::APlus, Band::A, Band::B, Band::C, Band::D];

    /// Returns the band label used in payloads and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::APlus => "A+",
            Band::A => "A",
            Band::B => "B",
            Band::C => "C",
            Band::D => "D",
        }
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Band {
    type Err = BandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Band::ALL
            .into_iter()
            .find(|band| band.as_str() == s)
            .ok_or_else(|| BandParseError(s.to_string()))
    }
}

/// Error returned when a band label is not one of the five known labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown band label {0:?}")]
pub struct BandParseError(pub String);

// ============================================================================
// Canonical text forms
// ============================================================================

/// `strftime` pattern of `time_utc`: UTC, second resolution.
pub const TIME_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// `strftime` pattern of the timestamp embedded in export file names.
pub const FILENAME_TIME_FORMAT: &str = "%Y%m%d_%H%M%SZ";

/// Number of fractional digits in `final_align`.
pub const ALIGN_FRACTION_DIGITS: usize = 9;

/// Formats a UTC instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_time_utc(at: DateTime<Utc>) -> String {
    at.format(TIME_UTC_FORMAT).to_string()
}

/// Formats a UTC instant as `YYYYMMDD_HHMMSSZ` for file names.
pub fn format_filename_time(at: DateTime<Utc>) -> String {
    at.format(FILENAME_TIME_FORMAT).to_string()
}

/// Formats an alignment value with an explicit sign and nine fractional
/// digits, e.g. `+0.123456789`.
pub fn format_alignment(alignment: f64) -> String {
    format!("{:+.*}", ALIGN_FRACTION_DIGITS, alignment)
}

// ============================================================================
// Tick records
// ============================================================================

/// The immutable result of one tick.
///
/// Produced once per tick by the engine and retained in an append-only
/// sequence for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    pub tick_index: TickIndex,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub time_utc: String,
    /// Canonical text of [`TickRecord::alignment`], as hashed into the stamp.
    pub final_align: String,
    /// Unrounded alignment in (−1, +1). Not exported.
    pub alignment: f64,
    pub band: Band,
    pub stamp: Stamp,
    /// Configured cadence for this tick, milliseconds.
    pub tick_ms: f64,
    /// Measured time since the previous tick, milliseconds.
    pub dt_ms: f64,
    /// Stress offset applied to this tick.
    pub a_stress: f64,
}

/// One exported row as read back from storage.
///
/// `time_utc`, `final_align`, and `band` keep the exact stored text: they are
/// only ever checked by replaying the chain, so any textual change surfaces
/// as a chain mismatch at this row rather than a parse failure.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub tick_index: TickIndex,
    pub time_utc: String,
    pub final_align: String,
    pub band: String,
    pub stamp: Stamp,
    pub tick_ms: f64,
    pub dt_ms: f64,
    pub a_stress: f64,
}

impl From<&TickRecord> for StoredRecord {
    fn from(record: &TickRecord) -> Self {
        Self {
            tick_index: record.tick_index,
            time_utc: record.time_utc.clone(),
            final_align: record.final_align.clone(),
            band: record.band.as_str().to_string(),
            stamp: record.stamp,
            tick_ms: record.tick_ms,
            dt_ms: record.dt_ms,
            a_stress: record.a_stress,
        }
    }
}
