//! augmented — lift a layer's state with zero-initialised dimensions.
//!
//! Purpose
//! -------
//! Wrap any [`DiffEqLayer`] so each invocation solves the inner problem
//! from `augment(x, adim)` instead of `x`.
//!
//! Key behaviors
//! -------------
//! - 1-D input `(n)` becomes `(n + adim)` with the trailing `adim` entries
//!   zero.
//! - Input with two or more axes gets `adim` zero entries appended along the
//!   second-to-last axis; the last (batch) axis is untouched.
//! - Every configuration accessor delegates to the inner layer, so the
//!   wrapper can stand in for it anywhere.
//!
//! Invariants & assumptions
//! ------------------------
//! - The inner layer's models must accept the augmented width.
//! - Layers treat axis 0 as the state axis, so [`AugmentedLayer`] accepts
//!   only `(n)` or `(n, batch)` inputs; [`augment`] itself handles any rank.
//! - The wrapper holds no state beyond `adim`.
use ndarray::{concatenate, Axis};

use crate::{
    errors::{NdeError, NdeResult},
    layers::traits::{DiffEqLayer, ForwardArgs, Solution},
    problem::types::{EquationClass, TimeSpan},
    sensitivity::algorithm::SensitivityAlgorithm,
    solver::{options::SolverOptions, traits::TrajectorySolver},
    types::{Params, State, StateView},
};

/// Append `adim` zero entries along the state axis of `x`.
///
/// # Errors
/// [`NdeError::ShapeMismatch`] for a 0-dimensional input.
pub fn augment(x: StateView<'_>, adim: usize) -> NdeResult<State> {
    let axis = match x.ndim() {
        0 => {
            return Err(NdeError::ShapeMismatch { what: "augmented input axes", expected: 1, found: 0 })
        }
        1 => Axis(0),
        n => Axis(n - 2),
    };
    let mut pad_shape = x.shape().to_vec();
    pad_shape[axis.index()] = adim;
    let pad = State::zeros(pad_shape);
    Ok(concatenate(axis, &[x.view(), pad.view()])?)
}

/// AugmentedLayer — an inner layer solved on a lifted state space.
#[derive(Debug, Clone)]
pub struct AugmentedLayer<L> {
    inner: L,
    adim: usize,
}

impl<L: DiffEqLayer> AugmentedLayer<L> {
    pub fn new(inner: L, adim: usize) -> Self {
        Self { inner, adim }
    }

    pub fn adim(&self) -> usize {
        self.adim
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: DiffEqLayer> DiffEqLayer for AugmentedLayer<L> {
    fn class(&self) -> EquationClass {
        self.inner.class()
    }

    fn default_params(&self) -> &Params {
        self.inner.default_params()
    }

    fn param_count(&self) -> usize {
        self.inner.param_count()
    }

    fn tspan(&self) -> TimeSpan {
        self.inner.tspan()
    }

    fn solver_options(&self) -> &SolverOptions {
        self.inner.solver_options()
    }

    fn default_sensitivity(&self) -> SensitivityAlgorithm {
        self.inner.default_sensitivity()
    }

    fn forward(
        &self, x: StateView<'_>, args: &ForwardArgs, solver: &dyn TrajectorySolver,
    ) -> NdeResult<Solution> {
        if x.ndim() > 2 {
            return Err(NdeError::ShapeMismatch {
                what: "augmented layer input axes",
                expected: 2,
                found: x.ndim(),
            });
        }
        let lifted = augment(x.view(), self.adim)?;
        log::trace!("augmented input {:?} -> {:?}", x.shape(), lifted.shape());
        self.inner.forward(lifted.view(), args, solver)
    }
}
