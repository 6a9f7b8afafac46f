//! NeuralOde — `du/dt = model(u; p)`.
use crate::{
    dynamics::builders::{ode_dynamics, ModelCall},
    errors::NdeResult,
    layers::{
        core::{check_model_params, finish, initial_state, state_cells, LayerCore},
        traits::{DiffEqLayer, ForwardArgs, Solution},
    },
    models::capability::SubModel,
    params::ParamLayout,
    problem::{factory::ode_problem, types::{EquationClass, TimeSpan}},
    solver::{options::SolverOptions, traits::TrajectorySolver},
    types::{Params, StateView},
};

/// Plain neural ODE layer.
///
/// Invoking the layer on `x` solves `u' = model(u; p)` with `u(t0) = x`.
#[derive(Debug, Clone)]
pub struct NeuralOde {
    model: SubModel,
    core: LayerCore,
}

impl NeuralOde {
    /// # Errors
    /// [`crate::errors::NdeError::ShapeMismatch`] if `p.len()` differs from
    /// the model's parameter count.
    pub fn new(
        model: SubModel, p: Params, tspan: TimeSpan, options: SolverOptions,
    ) -> NdeResult<Self> {
        check_model_params("parameter vector", &model, &p)?;
        let layout = ParamLayout::single(p.len());
        let core = LayerCore::new(EquationClass::Ode, p, layout, tspan, options)?;
        Ok(Self { model, core })
    }

    pub fn model(&self) -> &SubModel {
        &self.model
    }
}

impl DiffEqLayer for NeuralOde {
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
        let problem = ode_problem(ode_dynamics(call), u0, self.core.tspan, p);
        let trajectory = self.core.dispatch(problem, args.params.is_some(), solver)?;

        Ok(Solution::new(trajectory, finish(cells)))
    }
}
