//! traits — the shared layer interface and per-call inputs/outputs.
//!
//! Purpose
//! -------
//! Give all six layer variants and the augmentation wrapper one interface,
//! [`DiffEqLayer`], so they are interchangeable wherever a layer is invoked
//! or its configuration inspected.
//!
//! Key behaviors
//! -------------
//! - [`ForwardArgs`] carries optional per-call overrides: a parameter vector,
//!   incoming explicit model states, and (DAE only) an initial derivative.
//! - [`Solution`] pairs the solver's [`Trajectory`] with the final state of
//!   every explicit-state sub-model, in sub-model order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Overrides never mutate the layer; a layer may be invoked many times with
//!   different parameter vectors.
//! - `Solution::states` is empty for layers whose sub-models are all
//!   self-contained.
use crate::{
    errors::NdeResult,
    models::state::ModelState,
    problem::types::{EquationClass, TimeSpan},
    sensitivity::{algorithm::SensitivityAlgorithm, policy::default_sensitivity},
    solver::{options::SolverOptions, traits::TrajectorySolver, trajectory::Trajectory},
    types::{Params, State, StateView},
};

/// Optional per-call inputs to [`DiffEqLayer::forward`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardArgs {
    pub params: Option<Params>,
    pub states: Option<Vec<ModelState>>,
    pub du0: Option<State>,
}

impl ForwardArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// One state per explicit-state sub-model, in sub-model order.
    pub fn with_states(mut self, states: Vec<ModelState>) -> Self {
        self.states = Some(states);
        self
    }

    pub fn with_du0(mut self, du0: State) -> Self {
        self.du0 = Some(du0);
        self
    }
}

/// Result of one layer invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub trajectory: Trajectory,
    pub states: Vec<ModelState>,
}

impl Solution {
    pub fn new(trajectory: Trajectory, states: Vec<ModelState>) -> Self {
        Self { trajectory, states }
    }
}

/// A differential layer: a network lifted into a continuous-time problem.
pub trait DiffEqLayer {
    fn class(&self) -> EquationClass;

    /// Stored flat parameter vector.
    fn default_params(&self) -> &Params;

    fn param_count(&self) -> usize {
        self.default_params().len()
    }

    fn tspan(&self) -> TimeSpan;

    fn solver_options(&self) -> &SolverOptions;

    fn default_sensitivity(&self) -> SensitivityAlgorithm {
        default_sensitivity(self.class())
    }

    /// Build the problem for input `x`, dispatch it to `solver`, and return
    /// the trajectory plus any final explicit model states.
    ///
    /// # Errors
    /// - [`crate::errors::NdeError::ShapeMismatch`] for a wrong-length
    ///   parameter override or state list.
    /// - [`crate::errors::NdeError::Configuration`] for missing per-call
    ///   inputs.
    /// - Any error the solver or a model reports, unchanged.
    fn forward(
        &self, x: StateView<'_>, args: &ForwardArgs, solver: &dyn TrajectorySolver,
    ) -> NdeResult<Solution>;
}
