//! Closure signatures handed to trajectory solvers.
//!
//! Every closure is a pure function of its arguments and the model(s) it
//! captures, apart from explicit-state models writing their latest state to a
//! caller-owned [`StateCell`](crate::models::StateCell). Failures inside a
//! closure are returned, never swallowed, so the solver can pass them back.
use std::sync::Arc;

use crate::{
    errors::NdeResult,
    types::{ParamsView, State, StateView},
};

/// `f(u, p, t) -> du/dt`; also used for drift, diffusion, and `tgrad`.
pub type OdeFn<'a> = Box<dyn Fn(StateView<'_>, ParamsView<'_>, f64) -> NdeResult<State> + 'a>;

/// History lookup `h(p, t) -> u(t)` as seen from inside delay dynamics.
pub type History<'h> = dyn Fn(ParamsView<'_>, f64) -> NdeResult<State> + 'h;

/// Caller-supplied history function for times before the span start.
pub type HistoryFn = Arc<dyn Fn(ParamsView<'_>, f64) -> NdeResult<State> + Send + Sync>;

/// `f(u, h, p, t) -> du/dt` for constant-delay equations.
pub type DdeFn<'a> =
    Box<dyn Fn(StateView<'_>, &History<'_>, ParamsView<'_>, f64) -> NdeResult<State> + 'a>;

/// `f(du, u, p, t) -> residual` for masked DAEs.
pub type DaeFn<'a> =
    Box<dyn Fn(StateView<'_>, StateView<'_>, ParamsView<'_>, f64) -> NdeResult<State> + 'a>;

/// Algebraic constraints `g(u, p, t)` for DAE and mass-matrix layers.
pub type ConstraintsFn = Arc<dyn Fn(StateView<'_>, ParamsView<'_>, f64) -> NdeResult<State> + Send + Sync>;
