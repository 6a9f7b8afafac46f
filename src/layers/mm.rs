//! NeuralOdeMm — `M · u' = [model(u; p); g(u, p, t)]`.
//!
//! Rows of the right-hand side are model outputs first, constraint outputs
//! second; singular rows of `M` make the trailing rows algebraic. No mask is
//! involved.
use std::sync::Arc;

use crate::{
    dynamics::{
        builders::{mass_matrix_dynamics, ModelCall},
        types::ConstraintsFn,
    },
    errors::NdeResult,
    layers::{
        core::{check_model_params, finish, initial_state, state_cells, LayerCore},
        traits::{DiffEqLayer, ForwardArgs, Solution},
    },
    models::capability::SubModel,
    params::ParamLayout,
    problem::{
        factory::mass_matrix_problem,
        types::{EquationClass, TimeSpan},
        validation::validate_mass_matrix,
    },
    solver::{options::SolverOptions, traits::TrajectorySolver},
    types::{Matrix, Params, ParamsView, State, StateView},
};

#[derive(Clone)]
pub struct NeuralOdeMm {
    model: SubModel,
    constraints: ConstraintsFn,
    mass_matrix: Matrix,
    core: LayerCore,
}

impl NeuralOdeMm {
    /// # Errors
    /// [`crate::errors::NdeError::ShapeMismatch`] if the mass matrix is not
    /// square or `p` does not match the model. The combined model and
    /// constraint output is checked against the matrix on every evaluation.
    pub fn new<F>(
        model: SubModel, p: Params, constraints: F, mass_matrix: Matrix, tspan: TimeSpan,
        options: SolverOptions,
    ) -> NdeResult<Self>
    where
        F: Fn(StateView<'_>, ParamsView<'_>, f64) -> NdeResult<State> + Send + Sync + 'static,
    {
        validate_mass_matrix(&mass_matrix)?;
        check_model_params("parameter vector", &model, &p)?;
        let layout = ParamLayout::single(p.len());
        let core = LayerCore::new(EquationClass::MassMatrixOde, p, layout, tspan, options)?;
        Ok(Self { model, constraints: Arc::new(constraints), mass_matrix, core })
    }

    pub fn mass_matrix(&self) -> &Matrix {
        &self.mass_matrix
    }
}

impl std::fmt::Debug for NeuralOdeMm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralOdeMm")
            .field("model", &self.model)
            .field("mass_matrix", &self.mass_matrix.dim())
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl DiffEqLayer for NeuralOdeMm {
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
        let f = mass_matrix_dynamics(call, &self.constraints, self.mass_matrix.nrows());
        let problem = mass_matrix_problem(f, &self.mass_matrix, u0, self.core.tspan, p)?;
        let trajectory = self.core.dispatch(problem, args.params.is_some(), solver)?;

        Ok(Solution::new(trajectory, finish(cells)))
    }
}
