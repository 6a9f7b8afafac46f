//! problem — descriptors for the six equation classes.
//!
//! Purpose
//! -------
//! Define the ephemeral [`Problem`] value a layer hands to a trajectory
//! solver, along with [`TimeSpan`], [`EquationClass`], and [`NoiseShape`].
//!
//! Key behaviors
//! -------------
//! - [`factory`]: `ode_problem`, `sde_problem`, `dde_problem`,
//!   `dae_problem`, and `mass_matrix_problem`.
//! - [`validation`]: mass-matrix, mask, and lag checks.
//! - [`types`]: the descriptor structs.
//!
//! Invariants & assumptions
//! ------------------------
//! - Descriptors are never persisted; they borrow the layer that built them.
//! - A delay descriptor always carries both a history function and a
//!   non-empty lag list.

pub mod factory;
pub mod types;
pub mod validation;

pub use self::factory::{dae_problem, dde_problem, mass_matrix_problem, ode_problem, sde_problem};
pub use self::types::{
    DaeProblem, DdeProblem, EquationClass, MassMatrixProblem, NoiseShape, OdeProblem, Problem,
    SdeProblem, TimeSpan,
};
pub use self::validation::{validate_lags, validate_mass_matrix, validate_state_rows};
