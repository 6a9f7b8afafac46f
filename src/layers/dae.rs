//! dae — masked neural DAE layer and its builder.
//!
//! Purpose
//! -------
//! Solve the implicit system `F(du, u, p, t) = 0` whose differential rows
//! come from a model applied to `[u; du]` and whose algebraic rows come from
//! a constraints function `g(u, p, t)`.
//!
//! Key behaviors
//! -------------
//! - Row `i` of the residual is the next model output when
//!   `differential_vars[i]` is `true`, otherwise the next constraint output.
//! - Both self-contained and explicit-state models are accepted; a
//!   self-contained model is flattened before the layer exists, so its
//!   rebuild function is always available to the residual.
//! - The initial derivative `du0` is a stored default that the caller can
//!   override per call; a solve without either is a `Configuration` error.
//!
//! Invariants & assumptions
//! ------------------------
//! - `differential_vars.len()` equals the state dimension; checked when the
//!   descriptor is first built.
//! - The model outputs one row per `true` mask entry and the constraints one
//!   row per `false` entry; checked on every residual evaluation.
use std::sync::Arc;

use crate::{
    dynamics::{
        builders::{masked_dae_residual, ModelCall},
        types::ConstraintsFn,
    },
    errors::{NdeError, NdeResult},
    layers::{
        core::{check_model_params, finish, initial_state, state_cells, LayerCore},
        traits::{DiffEqLayer, ForwardArgs, Solution},
    },
    models::capability::SubModel,
    params::ParamLayout,
    problem::{factory::dae_problem, types::{EquationClass, TimeSpan}},
    solver::{options::SolverOptions, traits::TrajectorySolver},
    types::{Params, ParamsView, State, StateView},
};

#[derive(Clone)]
pub struct NeuralDae {
    model: SubModel,
    constraints: ConstraintsFn,
    differential_vars: Vec<bool>,
    du0: Option<State>,
    core: LayerCore,
}

impl NeuralDae {
    pub fn builder(model: SubModel, p: Params, tspan: TimeSpan) -> NeuralDaeBuilder {
        NeuralDaeBuilder::new(model, p, tspan)
    }

    pub fn differential_vars(&self) -> &[bool] {
        &self.differential_vars
    }

    pub fn du0(&self) -> Option<&State> {
        self.du0.as_ref()
    }
}

impl std::fmt::Debug for NeuralDae {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralDae")
            .field("model", &self.model)
            .field("differential_vars", &self.differential_vars)
            .field("du0", &self.du0)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

pub struct NeuralDaeBuilder {
    model: SubModel,
    p: Params,
    tspan: TimeSpan,
    options: SolverOptions,
    constraints: Option<ConstraintsFn>,
    differential_vars: Option<Vec<bool>>,
    du0: Option<State>,
}

impl NeuralDaeBuilder {
    pub fn new(model: SubModel, p: Params, tspan: TimeSpan) -> Self {
        Self {
            model,
            p,
            tspan,
            options: SolverOptions::default(),
            constraints: None,
            differential_vars: None,
            du0: None,
        }
    }

    pub fn options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn constraints<F>(mut self, constraints: F) -> Self
    where
        F: Fn(StateView<'_>, ParamsView<'_>, f64) -> NdeResult<State> + Send + Sync + 'static,
    {
        self.constraints = Some(Arc::new(constraints));
        self
    }

    /// `true` marks a row governed by the model, `false` an algebraic row.
    pub fn differential_vars(mut self, mask: impl Into<Vec<bool>>) -> Self {
        self.differential_vars = Some(mask.into());
        self
    }

    pub fn du0(mut self, du0: State) -> Self {
        self.du0 = Some(du0);
        self
    }

    /// # Errors
    /// - [`NdeError::Configuration`] if the constraints function or the mask
    ///   is missing.
    /// - [`NdeError::ShapeMismatch`] if `p` does not match the model or the
    ///   stored `du0` does not have one row per mask entry.
    pub fn build(self) -> NdeResult<NeuralDae> {
        let constraints = self.constraints.ok_or(NdeError::Configuration {
            field: "constraints",
            reason: "Masked DAE layers need a constraints function.",
        })?;
        let differential_vars = self.differential_vars.ok_or(NdeError::Configuration {
            field: "differential_vars",
            reason: "Masked DAE layers need a differential-variable mask.",
        })?;
        if let Some(du0) = &self.du0 {
            let rows = if du0.ndim() == 0 { 1 } else { du0.shape()[0] };
            if rows != differential_vars.len() {
                return Err(NdeError::ShapeMismatch {
                    what: "initial derivative rows",
                    expected: differential_vars.len(),
                    found: rows,
                });
            }
        }
        check_model_params("parameter vector", &self.model, &self.p)?;
        let layout = ParamLayout::single(self.p.len());
        let core =
            LayerCore::new(EquationClass::MaskedDae, self.p, layout, self.tspan, self.options)?;
        Ok(NeuralDae { model: self.model, constraints, differential_vars, du0: self.du0, core })
    }
}

impl DiffEqLayer for NeuralDae {
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
        let du0 = args.du0.as_ref().or(self.du0.as_ref()).cloned().ok_or(
            NdeError::Configuration {
                field: "du0",
                reason: "Masked DAE layers need an initial derivative, stored or per call.",
            },
        )?;
        let cells = state_cells(&[&self.model], args.states.as_ref())?;

        let call = ModelCall::new(&self.model, cells[0].as_ref())?;
        let f = masked_dae_residual(call, &self.constraints, &self.differential_vars);
        let problem = dae_problem(f, du0, u0, self.core.tspan, p, &self.differential_vars)?;
        let trajectory = self.core.dispatch(problem, args.params.is_some(), solver)?;

        Ok(Solution::new(trajectory, finish(cells)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{activations::Activation, mlp::Mlp};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover builder validation. Residual assembly is covered in
    // `dynamics::residual`; solver dispatch in the integration tests.
    // -------------------------------------------------------------------------

    fn parts() -> (SubModel, Params, TimeSpan) {
        // Model input is [u; du] with n = 3, output one row per `true` entry.
        let mlp = Mlp::with_init(&[6, 2], &[Activation::Identity], |_, _, _| 0.1).unwrap();
        let (sub, p) = SubModel::self_contained(&mlp);
        (sub, p, TimeSpan::new(0.0, 1.0).unwrap())
    }

    #[test]
    fn mask_is_required() {
        let (sub, p, span) = parts();
        let err = NeuralDae::builder(sub, p, span)
            .constraints(|u, _p, _t| Ok(array![u[[0]] + u[[1]] + u[[2]] - 1.0].into_dyn()))
            .build()
            .unwrap_err();
        assert!(matches!(err, NdeError::Configuration { field: "differential_vars", .. }));
    }

    #[test]
    fn constraints_are_required() {
        let (sub, p, span) = parts();
        let err = NeuralDae::builder(sub, p, span)
            .differential_vars([true, true, false])
            .build()
            .unwrap_err();
        assert!(matches!(err, NdeError::Configuration { field: "constraints", .. }));
    }

    #[test]
    // Purpose
    // -------
    // A self-contained model builds a working layer, and a stored du0 whose
    // row count disagrees with the mask is rejected.
    fn self_contained_model_is_supported() {
        let (sub, p, span) = parts();
        let build = |du0: State| {
            NeuralDae::builder(sub.clone(), p.clone(), span)
                .constraints(|u, _p, _t| Ok(array![u[[0]] + u[[1]] + u[[2]] - 1.0].into_dyn()))
                .differential_vars(vec![true, true, false])
                .du0(du0)
                .build()
        };

        let layer = build(array![-0.04, 0.04, 0.0].into_dyn()).unwrap();
        let bad = build(array![0.0, 0.0].into_dyn());

        assert_eq!(layer.differential_vars(), &[true, true, false]);
        assert_eq!(layer.default_sensitivity().name(), "DirectAutodiff");
        assert!(matches!(bad, Err(NdeError::ShapeMismatch { what: "initial derivative rows", .. })));
    }
}
