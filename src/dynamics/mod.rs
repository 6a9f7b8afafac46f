//! dynamics — pure right-hand-side and residual closures for solvers.
//!
//! Purpose
//! -------
//! Build, once per layer invocation, the function a trajectory solver
//! integrates: a derivative `f(u, p, t)`, a drift/diffusion pair, a
//! delay-aware derivative `f(u, h, p, t)`, or an algebraic residual
//! `F(du, u, p, t)`.
//!
//! Key behaviors
//! -------------
//! - [`builders`]: [`ModelCall`] plus one builder per dynamics shape.
//! - [`residual`]: masked interleaving and mass-matrix concatenation.
//! - [`types`]: boxed closure aliases shared with the problem descriptors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Closures depend only on their arguments and captured models, so the
//!   solver can differentiate them with respect to `p`. The one exception is
//!   the explicit-state path, which writes to a caller-owned
//!   [`StateCell`](crate::models::StateCell) that is read only after the
//!   solve returns.
//! - Closures borrow the layer and the call's state cells; they cannot
//!   outlive the invocation that built them.

pub mod builders;
pub mod residual;
pub mod types;

pub use self::builders::{
    basic_dde_tgrad, basic_tgrad, delay_dynamics, mass_matrix_dynamics, masked_dae_residual,
    ode_dynamics, sde_dynamics, ModelCall,
};
pub use self::residual::{assemble_masked, concat_outputs};
pub use self::types::{ConstraintsFn, DaeFn, DdeFn, History, HistoryFn, OdeFn};
