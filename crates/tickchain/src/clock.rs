//! Time sources for a session.
//!
//! A [`Clock`] answers two questions: what the wall-clock time is (for the
//! `time_utc` text of a tick) and how far a monotonic counter has advanced
//! (for `dt_ms`). Keeping the two apart means a wall-clock jump never shows
//! up as jitter.

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

/// Supplies wall-clock and monotonic readings.
pub trait Clock {
    /// Current UTC wall-clock time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Milliseconds on a monotonic counter with an arbitrary origin.
    fn monotonic_ms(&self) -> f64;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
///
/// Both readings advance together through [`ManualClock::advance_ms`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualClock {
    wall: DateTime<Utc>,
    monotonic_ms: f64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            wall: start,
            monotonic_ms: 0.0,
        }
    }

    /// Moves both readings forward by `ms` milliseconds.
    pub fn advance_ms(&mut self, ms: f64) {
        self.monotonic_ms += ms;
        // Sub-millisecond remainders only affect the monotonic reading
        self.wall += Duration::milliseconds(ms as i64);
    }

    /// Moves only the wall clock, as a system time adjustment would.
    pub fn jump_wall(&mut self, by: Duration) {
        self.wall += by;
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }

    fn monotonic_ms(&self) -> f64 {
        (**self).monotonic_ms()
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.wall
    }

    fn monotonic_ms(&self) -> f64 {
        self.monotonic_ms
    }
}
