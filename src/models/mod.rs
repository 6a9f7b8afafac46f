//! models — model capability contract and a reference dense network.
//!
//! Purpose
//! -------
//! Define the two model shapes differential layers accept (self-contained
//! and explicit-state), the explicit state they thread, and a small MLP that
//! satisfies both contracts.
//!
//! Key behaviors
//! -------------
//! - [`capability`]: [`Model`], [`Destructure`], [`Restructure`],
//!   [`ExplicitModel`], and the [`SubModel`] tag layers store.
//! - [`state`]: [`ModelState`] and the single-slot [`StateCell`] used while a
//!   solver drives an explicit-state model.
//! - [`mlp`]: [`Mlp`] / [`Dense`], usable either way.
//! - [`activations`]: stable elementwise nonlinearities.
//!
//! Invariants & assumptions
//! ------------------------
//! - Model evaluation is pure given `(input, params, state)`; nothing here
//!   caches across calls.
//! - Shape problems surface as `NdeError::ShapeMismatch`, other evaluation
//!   failures as `NdeError::Model`.

pub mod activations;
pub mod capability;
pub mod mlp;
pub mod state;

pub use self::activations::Activation;
pub use self::capability::{Destructure, ExplicitModel, Model, ModelKind, Restructure, SubModel};
pub use self::mlp::{Dense, Mlp};
pub use self::state::{ModelState, StateCell};
