//! Numerically stable activation functions.
//!
//! The nonlinear transforms here are prone to overflow/underflow in naïve
//! form. They follow guarded strategies similar to those in major ML
//! libraries (e.g. PyTorch), using an explicit cutoff (`|x| > 20.0`) to keep
//! `f64` arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`Activation`]: elementwise nonlinearity applied after a dense layer.
//! - [`safe_softplus(x)`]: stable version of `ln(1 + exp(x))`.
//! - [`safe_sigmoid(x)`]: stable logistic `1 / (1 + exp(-x))`.

/// Cutoff beyond which softplus and sigmoid switch to their asymptotes.
const STABLE_CUTOFF: f64 = 20.0;

/// Elementwise activation of a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Identity,
    Tanh,
    Relu,
    Softplus,
    Sigmoid,
}

impl Activation {
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::Softplus => safe_softplus(x),
            Activation::Sigmoid => safe_sigmoid(x),
        }
    }
}

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`, which is accurate for large
///   negative `x` as well.
pub fn safe_softplus(x: f64) -> f64 {
    if x > STABLE_CUTOFF { x } else { x.exp().ln_1p() }
}

/// Numerically stable logistic function.
///
/// Evaluates `exp(x) / (1 + exp(x))` for negative inputs so `exp` never
/// overflows.
pub fn safe_sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
