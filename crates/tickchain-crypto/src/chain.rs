//! Chain state and replay verification.
//!
//! [`StampChain`] holds the tail of a live chain and appends one link per
//! tick. [`verify_chain`] replays a recorded sequence from an empty tail and
//! stops at the first stamp that does not match.

use thiserror::Error;
use tickchain_types::{Stamp, StoredRecord, TickIndex, TickRecord};

use crate::stamp::{make_stamp, stamp_payload};

/// The fields of a recorded tick that the chain commits to.
pub trait ChainLink {
    fn tick_index(&self) -> TickIndex;
    fn time_utc(&self) -> &str;
    fn final_align(&self) -> &str;
    fn band_label(&self) -> &str;
    fn stamp(&self) -> Stamp;
}

impl ChainLink for TickRecord {
    fn tick_index(&self) -> TickIndex {
        self.tick_index
    }

    fn time_utc(&self) -> &str {
        &self.time_utc
    }

    fn final_align(&self) -> &str {
        &self.final_align
    }

    fn band_label(&self) -> &str {
        self.band.as_str()
    }

    fn stamp(&self) -> Stamp {
        self.stamp
    }
}

impl ChainLink for StoredRecord {
    fn tick_index(&self) -> TickIndex {
        self.tick_index
    }

    fn time_utc(&self) -> &str {
        &self.time_utc
    }

    fn final_align(&self) -> &str {
        &self.final_align
    }

    fn band_label(&self) -> &str {
        &self.band
    }

    fn stamp(&self) -> Stamp {
        self.stamp
    }
}

/// Tail of a live stamp chain.
///
/// Starts empty; every [`StampChain::append`] produces the next stamp and
/// makes it the new tail. The chain never branches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StampChain {
    head: Option<Stamp>,
    len: u64,
}

impl StampChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recent stamp, or `None` before the first link.
    pub fn head(&self) -> Option<&Stamp> {
        self.head.as_ref()
    }

    /// Returns the number of links appended since creation or reset.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends one link and returns its stamp.
    pub fn append(&mut self, time_utc: &str, final_align: &str, band: &str) -> Stamp {
        let payload = stamp_payload(time_utc, final_align, band);
        let stamp = make_stamp(self.head.as_ref(), &payload, time_utc);

        self.head = Some(stamp);
        self.len += 1;

        // Postcondition: head is the stamp just produced
        debug_assert_eq!(self.head, Some(stamp));

        stamp
    }

    /// Returns the chain to its empty starting state.
    pub fn reset(&mut self) {
        self.head = None;
        self.len = 0;
    }
}

/// A recorded stamp does not match the stamp recomputed by replay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chain mismatch at tick_index {tick_index}: stored {stored}, expected {expected}")]
pub struct ChainIntegrityError {
    pub tick_index: TickIndex,
    pub stored: Stamp,
    pub expected: Stamp,
}

/// Incremental replay of a recorded chain, one link at a time.
///
/// Lets a reader check each record as soon as it is parsed, so the first
/// bad record is reported whether it is unreadable or mismatched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainVerifier {
    prev: Option<Stamp>,
    count: usize,
}

impl ChainVerifier {
    /// Starts a replay from an empty tail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the next link against the running tail.
    ///
    /// On a mismatch the verifier is left unchanged.
    pub fn check<L: ChainLink + ?Sized>(&mut self, link: &L) -> Result<(), ChainIntegrityError> {
        let payload = stamp_payload(link.time_utc(), link.final_align(), link.band_label());
        let expected = make_stamp(self.prev.as_ref(), &payload, link.time_utc());
        let stored = link.stamp();

        if expected != stored {
            return Err(ChainIntegrityError {
                tick_index: link.tick_index(),
                stored,
                expected,
            });
        }

        self.prev = Some(stored);
        self.count += 1;
        Ok(())
    }

    /// Number of links verified so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Replays a recorded chain from an empty tail.
///
/// Returns the number of links verified. On the first mismatch, returns the
/// failing link's tick index with the stored and expected stamps; links after
/// it are not examined. An empty sequence verifies with a count of 0.
pub fn verify_chain<'a, L, I>(links: I) -> Result<usize, ChainIntegrityError>
where
    L: ChainLink + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let mut verifier = ChainVerifier::new();
    for link in links {
        verifier.check(link)?;
    }
    Ok(verifier.count())
}
