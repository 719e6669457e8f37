//! Band classification.
//!
//! Thresholds are inclusive lower bounds, checked from the top:
//!
//! | Band | Alignment        |
//! |------|------------------|
//! | A+   | `>= 0.80`        |
//! | A    | `>= 0.40`        |
//! | B    | `>= 0.10`        |
//! | C    | `>= -0.10`       |
//! | D    | anything lower   |

use tickchain_types::Band;

pub const A_PLUS_MIN: f64 = 0.80;
pub const A_MIN: f64 = 0.40;
pub const B_MIN: f64 = 0.10;
pub const C_MIN: f64 = -0.10;

/// Maps a smoothed alignment to its band. NaN falls through to `D`.
pub fn classify(alignment: f64) -> Band {
    if alignment >= A_PLUS_MIN {
        Band::APlus
    } else if alignment >= A_MIN {
        Band::A
    } else if alignment >= B_MIN {
        Band::B
    } else if alignment >= C_MIN {
        Band::C
    } else {
        Band::D
    }
}
