//! neural_de — differential layers for continuous-time neural models.
//!
//! Purpose
//! -------
//! Lift a parameterised network into a continuous-time dynamical system
//! (ODE, SDE, constant-delay DDE, masked DAE, or mass-matrix ODE) and hand
//! the resulting problem to an external trajectory solver that can
//! differentiate the solve with respect to the network's parameters.
//!
//! Key behaviors
//! -------------
//! - Pack and slice flat parameter vectors across one or two sub-models
//!   ([`params`]).
//! - Build pure dynamics closures from self-contained or explicit-state
//!   models ([`dynamics`], [`models`]).
//! - Assemble per-class problem descriptors ([`problem`]) and choose a
//!   default sensitivity strategy ([`sensitivity`]).
//! - Dispatch to a [`solver::TrajectorySolver`] and return its trajectory
//!   plus any final model states ([`layers`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Dynamics closures are functions of `(u, p, t)` and the captured models
//!   only; self-contained models are rebuilt from `p` on every evaluation.
//! - Explicit-state models write to a per-call state cell that is read only
//!   after the solve returns.
//! - Integration and gradient computation are external; integration errors
//!   propagate unchanged.
//!
//! Conventions
//! -----------
//! - Parameter vectors are `Array1<f64>`; states are `ArrayD<f64>` of shape
//!   `(n)` or `(n, batch)`, with row operations along axis 0.
//! - Errors are [`errors::NdeError`] values; nothing in the library panics
//!   on bad input.
//!
//! Downstream usage
//! ----------------
//! - Build a sub-model with [`models::SubModel::self_contained`] or
//!   [`models::SubModel::explicit`], wrap it in a layer, and call
//!   [`layers::DiffEqLayer::forward`] with a solver implementation.
//! - `use neural_de::prelude::*;` imports the common surface.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module. Integration tests under `tests/`
//!   drive every layer through a fixed-step reference solver and a probe
//!   solver that records the descriptors it receives.

pub mod dynamics;
pub mod errors;
pub mod layers;
pub mod models;
pub mod params;
pub mod problem;
pub mod sensitivity;
pub mod solver;
pub mod types;

pub mod prelude {
    pub use crate::errors::{IntegrationError, IntegrationErrorKind, NdeError, NdeResult};
    pub use crate::layers::prelude::*;
    pub use crate::models::{
        Activation, Destructure, ExplicitModel, Mlp, Model, ModelState, SubModel,
    };
    pub use crate::problem::{EquationClass, Problem, TimeSpan};
    pub use crate::sensitivity::SensitivityAlgorithm;
    pub use crate::solver::{SolveRequest, SolverOptions, Trajectory, TrajectorySolver};
    pub use crate::types::{Matrix, Params, ParamsView, State, StateView};
}
