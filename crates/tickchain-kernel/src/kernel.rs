//! The kernel - decayed accumulation of alignment in `atanh` space.
//!
//! Each raw alignment is clamped into the open interval `(-1, 1)`, mapped
//! through `atanh`, and folded into a weighted running mean with
//! exponential decay. The mean is mapped back through `tanh`, so the output
//! always lies strictly inside `(-1, 1)`.
//!
//! ```text
//! u  = atanh(clamp(raw))
//! U' = decay * U + weight * u
//! W' = decay * W + weight
//! a  = tanh(U' / max(W', EPS_W))
//! ```
//!
//! # Example
//!
//! ```
//! use tickchain_kernel::{KernelParams, KernelState, apply};
//!
//! let (state, a_out) = apply(KernelState::new(), 0.02, &KernelParams::default());
//! assert!((a_out - 0.02).abs() < 1e-12);
//! assert!(state.w() > 0.0);
//! ```

/// Distance kept from ±1 before `atanh`.
pub const EPS_A: f64 = 1e-6;
/// Floor for the weight denominator.
pub const EPS_W: f64 = 1e-9;
/// Default per-tick decay factor.
pub const DEFAULT_DECAY: f64 = 0.995;
/// Default weight of a new sample.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Kernel tuning.
///
/// `decay` must lie in `(0, 1]` and `weight` must be positive; the config
/// layer rejects anything else before it reaches the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    pub decay: f64,
    pub weight: f64,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl KernelParams {
    pub fn new(decay: f64, weight: f64) -> Self {
        Self { decay, weight }
    }

    /// Returns true if `0 < decay <= 1` and `weight > 0`, both finite.
    pub fn is_valid(&self) -> bool {
        self.decay.is_finite()
            && self.decay > 0.0
            && self.decay <= 1.0
            && self.weight.is_finite()
            && self.weight > 0.0
    }
}

/// Accumulator state: decayed weighted sum `u` and decayed weight `w`.
///
/// Both start at zero. A fresh state is the only state a new session or a
/// reset session sees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelState {
    u: f64,
    w: f64,
}

impl KernelState {
    /// Creates the zeroed starting state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decayed weighted sum of `atanh` samples.
    pub fn u(&self) -> f64 {
        self.u
    }

    /// Decayed total weight.
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Returns true if no sample has been folded in yet.
    pub fn is_empty(&self) -> bool {
        self.w == 0.0
    }
}

/// Clamps `x` into `[-1 + EPS_A, 1 - EPS_A]`. NaN maps to 0.
pub fn clamp_alignment(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(-1.0 + EPS_A, 1.0 - EPS_A)
}

/// Inverse hyperbolic tangent of a clamped input, always finite.
pub fn atanh_safe(x: f64) -> f64 {
    let x = clamp_alignment(x);
    0.5 * (x.ln_1p() - (-x).ln_1p())
}

/// Folds one raw alignment into the accumulator.
///
/// Takes ownership of the state and returns the next state together with the
/// smoothed output.
pub fn apply(state: KernelState, raw: f64, params: &KernelParams) -> (KernelState, f64) {
    let u = atanh_safe(raw);

    let next = KernelState {
        u: params.decay * state.u + params.weight * u,
        w: params.decay * state.w + params.weight,
    };

    let denom = next.w.max(EPS_W);
    let a_out = (next.u / denom).tanh();

    // Postcondition: output is finite and strictly inside (-1, 1)
    assert!(
        a_out.is_finite() && a_out.abs() < 1.0,
        "kernel output {a_out} outside (-1, 1)"
    );

    (next, a_out)
}
