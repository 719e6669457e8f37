//! Text helpers for live sessions: the alignment sparkline and dt health.

use std::fmt::{self, Display};

/// Default number of alignments kept for the sparkline.
pub const HISTORY_LEN: usize = 24;

/// Maps one alignment to its sparkline glyph.
///
/// | glyph | alignment            |
/// |-------|----------------------|
/// | `v`   | `a <= -0.40`         |
/// | `/`   | `-0.40 < a < -0.10`  |
/// | `_`   | `-0.10 <= a <= 0.10` |
/// | `-`   | `0.10 < a <= 0.40`   |
/// | `^`   | `a > 0.40`           |
pub fn spark_glyph(alignment: f64) -> char {
    if alignment <= -0.40 {
        'v'
    } else if alignment < -0.10 {
        '/'
    } else if alignment <= 0.10 {
        '_'
    } else if alignment <= 0.40 {
        '-'
    } else {
        '^'
    }
}

/// Renders alignments oldest first.
pub fn sparkline<I>(alignments: I) -> String
where
    I: IntoIterator<Item = f64>,
{
    alignments.into_iter().map(spark_glyph).collect()
}

/// How far the measured interval strayed from the cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtHealth {
    /// Within 10% of the cadence.
    Nominal,
    /// Within 50% of the cadence.
    Drifting,
    /// 50% or more off.
    Stalled,
    /// No usable cadence.
    Unknown,
}

impl DtHealth {
    pub fn classify(dt_ms: f64, tick_ms: f64) -> Self {
        if !tick_ms.is_finite() || tick_ms <= 0.0 || !dt_ms.is_finite() {
            return Self::Unknown;
        }

        let ratio = (dt_ms - tick_ms).abs() / tick_ms;
        if ratio < 0.10 {
            Self::Nominal
        } else if ratio < 0.50 {
            Self::Drifting
        } else {
            Self::Stalled
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::Drifting => "drifting",
            Self::Stalled => "stalled",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for DtHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
