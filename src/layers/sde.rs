//! sde — drift/diffusion layers with diagonal or general noise.
//!
//! Purpose
//! -------
//! Lift a drift model and a diffusion model into
//! `du = drift(u; p1) dt + diffusion(u; p2) dW`.
//!
//! Key behaviors
//! -------------
//! - Both layers store `p = concat(p1, p2)` with `len = p1.len()`; the drift
//!   closure reads `p[..len]` and the diffusion closure `p[len..]`.
//! - [`NeuralDsde`] uses diagonal noise: the diffusion output has the shape
//!   of `u`.
//! - [`NeuralSde`] uses `nbrown` Wiener processes: the diffusion output is
//!   reshaped to the `(n, nbrown)` noise-rate prototype.
//!
//! Invariants & assumptions
//! ------------------------
//! - Explicit-state drift and diffusion models each get their own state
//!   cell; `Solution::states` lists drift before diffusion.
use crate::{
    dynamics::builders::{sde_dynamics, ModelCall},
    errors::{NdeError, NdeResult},
    layers::{
        core::{check_model_params, finish, initial_state, state_cells, LayerCore},
        traits::{DiffEqLayer, ForwardArgs, Solution},
    },
    models::capability::SubModel,
    params::pack_pair,
    problem::{factory::sde_problem, types::{EquationClass, TimeSpan}},
    solver::{options::SolverOptions, traits::TrajectorySolver},
    types::{Params, StateView},
};

#[derive(Debug, Clone)]
struct SdePair {
    drift: SubModel,
    diffusion: SubModel,
    nbrown: Option<usize>,
    core: LayerCore,
}

impl SdePair {
    #[allow(clippy::too_many_arguments)]
    fn new(
        class: EquationClass, drift: SubModel, p1: Params, diffusion: SubModel, p2: Params,
        nbrown: Option<usize>, tspan: TimeSpan, options: SolverOptions,
    ) -> NdeResult<Self> {
        check_model_params("drift parameter vector", &drift, &p1)?;
        check_model_params("diffusion parameter vector", &diffusion, &p2)?;
        let (p, layout) = pack_pair(&p1, &p2)?;
        let core = LayerCore::new(class, p, layout, tspan, options)?;
        Ok(Self { drift, diffusion, nbrown, core })
    }

    fn forward(
        &self, x: StateView<'_>, args: &ForwardArgs, solver: &dyn TrajectorySolver,
    ) -> NdeResult<Solution> {
        let p = self.core.resolve_params(args.params.as_ref())?;
        let u0 = initial_state(x)?;
        let cells = state_cells(&[&self.drift, &self.diffusion], args.states.as_ref())?;

        let drift = ModelCall::new(&self.drift, cells[0].as_ref())?;
        let diffusion = ModelCall::new(&self.diffusion, cells[1].as_ref())?;
        let (f, g) = sde_dynamics(drift, diffusion, self.core.layout, self.nbrown);
        let problem = sde_problem(f, g, u0, self.core.tspan, p, self.nbrown)?;
        let trajectory = self.core.dispatch(problem, args.params.is_some(), solver)?;

        Ok(Solution::new(trajectory, finish(cells)))
    }

    /// Length of the drift block at the front of the stored vector.
    fn split_len(&self) -> usize {
        self.core.layout.split_len().unwrap_or(self.core.p.len())
    }
}

/// Neural SDE with diagonal noise.
#[derive(Debug, Clone)]
pub struct NeuralDsde {
    inner: SdePair,
}

impl NeuralDsde {
    /// # Errors
    /// [`NdeError::ShapeMismatch`] if `p1` or `p2` does not match its model's
    /// parameter count.
    pub fn new(
        drift: SubModel, p1: Params, diffusion: SubModel, p2: Params, tspan: TimeSpan,
        options: SolverOptions,
    ) -> NdeResult<Self> {
        let inner = SdePair::new(
            EquationClass::DiagonalNoiseSde,
            drift,
            p1,
            diffusion,
            p2,
            None,
            tspan,
            options,
        )?;
        Ok(Self { inner })
    }

    pub fn split_len(&self) -> usize {
        self.inner.split_len()
    }
}

/// Neural SDE with `nbrown` mixed Wiener processes.
#[derive(Debug, Clone)]
pub struct NeuralSde {
    inner: SdePair,
}

impl NeuralSde {
    /// # Errors
    /// - [`NdeError::Configuration`] for `nbrown == 0`.
    /// - [`NdeError::ShapeMismatch`] if `p1` or `p2` does not match its
    ///   model's parameter count.
    pub fn new(
        drift: SubModel, p1: Params, diffusion: SubModel, p2: Params, nbrown: usize,
        tspan: TimeSpan, options: SolverOptions,
    ) -> NdeResult<Self> {
        if nbrown == 0 {
            return Err(NdeError::Configuration {
                field: "nbrown",
                reason: "General-noise SDEs need at least one Wiener process.",
            });
        }
        let inner = SdePair::new(
            EquationClass::GeneralNoiseSde,
            drift,
            p1,
            diffusion,
            p2,
            Some(nbrown),
            tspan,
            options,
        )?;
        Ok(Self { inner })
    }

    pub fn nbrown(&self) -> usize {
        self.inner.nbrown.unwrap_or(0)
    }

    pub fn split_len(&self) -> usize {
        self.inner.split_len()
    }
}

macro_rules! sde_layer {
    ($layer:ty) => {
        impl DiffEqLayer for $layer {
            fn class(&self) -> EquationClass {
                self.inner.core.class
            }

            fn default_params(&self) -> &Params {
                &self.inner.core.p
            }

            fn tspan(&self) -> TimeSpan {
                self.inner.core.tspan
            }

            fn solver_options(&self) -> &SolverOptions {
                &self.inner.core.options
            }

            fn forward(
                &self, x: StateView<'_>, args: &ForwardArgs, solver: &dyn TrajectorySolver,
            ) -> NdeResult<Solution> {
                self.inner.forward(x, args, solver)
            }
        }
    };
}

sde_layer!(NeuralDsde);
sde_layer!(NeuralSde);
