//! types — shared numeric aliases.
//!
//! Purpose
//! -------
//! Centralize the `ndarray` containers used across the crate so the other
//! modules stay agnostic to the concrete array generics.
//!
//! Conventions
//! -----------
//! - Parameter vectors are flat `f64` vectors ([`Params`]).
//! - States, derivatives, and residuals are dynamic-rank arrays ([`State`]).
//!   A 1-D state has shape `(n)`; a batched state has shape `(n, batch)` with
//!   the batch axis last. Concatenation and masking always act on axis 0.
//! - Dense matrices (mass matrices, noise-rate prototypes) are [`Matrix`].
use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayViewD};

/// Flat parameter vector `p`.
pub type Params = Array1<f64>;

/// Borrowed view over a flat parameter vector.
pub type ParamsView<'a> = ArrayView1<'a, f64>;

/// State, derivative, or residual array.
pub type State = ArrayD<f64>;

/// Borrowed view over a state-shaped array.
pub type StateView<'a> = ArrayViewD<'a, f64>;

/// Dense `f64` matrix.
pub type Matrix = Array2<f64>;
