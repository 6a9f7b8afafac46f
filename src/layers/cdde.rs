//! cdde — constant-delay neural DDE layer and its builder.
//!
//! Purpose
//! -------
//! Solve `u'(t) = model([u(t); u(t - τ₁); …; u(t - τ_k)]; p)` where past
//! states come from the solver's history and, before `t0`, from a
//! caller-supplied history function `h(p, t)`.
//!
//! Key behaviors
//! -------------
//! - [`NeuralCddeBuilder::build`] requires both a history function and a
//!   lag list; either one missing is a `Configuration` error.
//! - Lags are kept in the order given and forwarded to the solver on the
//!   descriptor.
//!
//! Invariants & assumptions
//! ------------------------
//! - The model's input width is `(k + 1) · n` for `k` lags and state
//!   dimension `n`; a mismatch surfaces from the model at first use.
//! - The history function covers `[t0 - max τ, t0]`.
use std::sync::Arc;

use crate::{
    dynamics::{
        builders::{delay_dynamics, ModelCall},
        types::HistoryFn,
    },
    errors::{NdeError, NdeResult},
    layers::{
        core::{check_model_params, finish, initial_state, state_cells, LayerCore},
        traits::{DiffEqLayer, ForwardArgs, Solution},
    },
    models::capability::SubModel,
    params::ParamLayout,
    problem::{
        factory::dde_problem,
        types::{EquationClass, TimeSpan},
        validation::validate_lags,
    },
    solver::{options::SolverOptions, traits::TrajectorySolver},
    types::{Params, ParamsView, State, StateView},
};

#[derive(Clone)]
pub struct NeuralCdde {
    model: SubModel,
    history: HistoryFn,
    lags: Vec<f64>,
    core: LayerCore,
}

impl NeuralCdde {
    pub fn builder(model: SubModel, p: Params, tspan: TimeSpan) -> NeuralCddeBuilder {
        NeuralCddeBuilder::new(model, p, tspan)
    }

    pub fn lags(&self) -> &[f64] {
        &self.lags
    }

    pub fn history(&self) -> &HistoryFn {
        &self.history
    }
}

impl std::fmt::Debug for NeuralCdde {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralCdde")
            .field("model", &self.model)
            .field("lags", &self.lags)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

/// Collects the delay-specific configuration of a [`NeuralCdde`].
pub struct NeuralCddeBuilder {
    model: SubModel,
    p: Params,
    tspan: TimeSpan,
    options: SolverOptions,
    history: Option<HistoryFn>,
    lags: Option<Vec<f64>>,
}

impl NeuralCddeBuilder {
    pub fn new(model: SubModel, p: Params, tspan: TimeSpan) -> Self {
        Self { model, p, tspan, options: SolverOptions::default(), history: None, lags: None }
    }

    pub fn options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn history<F>(mut self, history: F) -> Self
    where
        F: Fn(ParamsView<'_>, f64) -> NdeResult<State> + Send + Sync + 'static,
    {
        self.history = Some(Arc::new(history));
        self
    }

    pub fn history_fn(mut self, history: HistoryFn) -> Self {
        self.history = Some(history);
        self
    }

    pub fn lags(mut self, lags: impl Into<Vec<f64>>) -> Self {
        self.lags = Some(lags.into());
        self
    }

    /// # Errors
    /// - [`NdeError::Configuration`] if the history function or the lag list
    ///   is missing, or a lag is non-finite or not positive.
    /// - [`NdeError::ShapeMismatch`] if `p` does not match the model.
    pub fn build(self) -> NdeResult<NeuralCdde> {
        let history = self.history.ok_or(NdeError::Configuration {
            field: "history",
            reason: "Constant-delay layers need a history function.",
        })?;
        let lags = self.lags.ok_or(NdeError::Configuration {
            field: "lags",
            reason: "Constant-delay layers need a lag list.",
        })?;
        validate_lags(&lags)?;
        check_model_params("parameter vector", &self.model, &self.p)?;
        let layout = ParamLayout::single(self.p.len());
        let core =
            LayerCore::new(EquationClass::ConstantDelay, self.p, layout, self.tspan, self.options)?;
        Ok(NeuralCdde { model: self.model, history, lags, core })
    }
}

impl DiffEqLayer for NeuralCdde {
    fn class(&self) -> EquationClass {
        self.core.class
    }

    fn default_params(&self) -> &Params {
        &self.core.p
    }

    fn tspan(&self) -> TimeSpan {
        self.core.tspan
    }

    fn solver_options(&self) -> &SolverOptions {
        &self.core.options
    }

    fn forward(
        &self, x: StateView<'_>, args: &ForwardArgs, solver: &dyn TrajectorySolver,
    ) -> NdeResult<Solution> {
        let p = self.core.resolve_params(args.params.as_ref())?;
        let u0 = initial_state(x)?;
        let cells = state_cells(&[&self.model], args.states.as_ref())?;

        let call = ModelCall::new(&self.model, cells[0].as_ref())?;
        let f = delay_dynamics(call, &self.lags);
        let problem = dde_problem(f, u0, self.history.clone(), self.core.tspan, p, &self.lags);
        let trajectory = self.core.dispatch(problem, args.params.is_some(), solver)?;

        Ok(Solution::new(trajectory, finish(cells)))
    }
}
