//! builders — assemble per-call dynamics closures from sub-models.
//!
//! Purpose
//! -------
//! Turn a layer's sub-model(s), its parameter layout, and any variant extras
//! into the pure closure a trajectory solver integrates. A fresh closure is
//! built on every layer invocation and dropped when the solve returns.
//!
//! Key behaviors
//! -------------
//! - [`ModelCall`] evaluates one sub-model against the parameter slice the
//!   solver passes in:
//!   - self-contained: rebuild from the slice, then apply, on every call;
//!   - explicit-state: apply `(input, params, state)` and store the returned
//!     state in the call's [`StateCell`], returning only the output.
//! - One builder per dynamics shape: plain ([`ode_dynamics`]), dual-model
//!   drift/diffusion ([`sde_dynamics`]), delay-aware ([`delay_dynamics`]),
//!   masked DAE residual ([`masked_dae_residual`]), and mass-matrix
//!   right-hand side ([`mass_matrix_dynamics`]).
//! - [`basic_tgrad`] / [`basic_dde_tgrad`] report `∂f/∂t = 0`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Closures never cache a rebuilt model: reusing one across calls with
//!   different `p` would make the closure stop being a function of `p`.
//! - Parameter-vector length is checked by the layer before the solve;
//!   closures only slice.
//! - Delay lags are applied in list order; the model input is
//!   `[u; h(p, t - τ₁); …; h(p, t - τ_k)]` along axis 0.
use ndarray::{concatenate, Array2, Axis};

use crate::{
    dynamics::{
        residual::{assemble_masked, concat_outputs},
        types::{ConstraintsFn, DaeFn, DdeFn, History, OdeFn},
    },
    errors::{NdeError, NdeResult},
    models::{capability::SubModel, state::StateCell},
    params::ParamLayout,
    types::{ParamsView, State, StateView},
};

/// ModelCall — how one sub-model is evaluated inside a dynamics closure.
///
/// Borrowing the sub-model and, for explicit-state models, the call's state
/// cell keeps the closure free of hidden captured state.
#[derive(Clone, Copy)]
pub struct ModelCall<'a> {
    model: &'a SubModel,
    cell: Option<&'a StateCell>,
}

impl<'a> ModelCall<'a> {
    /// # Errors
    /// [`NdeError::Configuration`] if an explicit-state model is given no
    /// state cell.
    pub fn new(model: &'a SubModel, cell: Option<&'a StateCell>) -> NdeResult<Self> {
        if matches!(model, SubModel::ExplicitState(_)) && cell.is_none() {
            return Err(NdeError::Configuration {
                field: "state",
                reason: "Explicit-state models need a state cell for each call.",
            });
        }
        Ok(Self { model, cell })
    }

    pub fn eval(&self, input: StateView<'_>, params: ParamsView<'_>) -> NdeResult<State> {
        match (self.model, self.cell) {
            (SubModel::SelfContained(restructure), _) => {
                restructure.rebuild(params)?.forward(input)
            }
            (SubModel::ExplicitState(model), Some(cell)) => {
                cell.advance(|state| model.apply(input, params, state))
            }
            (SubModel::ExplicitState(_), None) => Err(NdeError::Configuration {
                field: "state",
                reason: "Explicit-state models need a state cell for each call.",
            }),
        }
    }
}

/// `f(u, p, t) = model(u; p)`.
pub fn ode_dynamics<'a>(call: ModelCall<'a>) -> OdeFn<'a> {
    Box::new(move |u, p, _t| call.eval(u, p))
}

/// Drift and diffusion closures over a split parameter vector.
///
/// The drift model reads `p[..len]`, the diffusion model `p[len..]`. With
/// `nbrown = Some(m)` the diffusion output is reshaped to the
/// `(u.len(), m)` noise-rate prototype.
pub fn sde_dynamics<'a>(
    drift: ModelCall<'a>, diffusion: ModelCall<'a>, layout: ParamLayout, nbrown: Option<usize>,
) -> (OdeFn<'a>, OdeFn<'a>) {
    let f: OdeFn<'a> = Box::new(move |u, p, _t| drift.eval(u, layout.first(p)));
    let g: OdeFn<'a> = Box::new(move |u, p, _t| {
        let p2 = layout.second(p).ok_or(NdeError::Configuration {
            field: "params",
            reason: "Diffusion model needs a split parameter layout.",
        })?;
        let out = diffusion.eval(u.view(), p2)?;
        match nbrown {
            None => Ok(out),
            Some(m) => reshape_noise(out, u.len(), m),
        }
    });
    (f, g)
}

fn reshape_noise(out: State, rows: usize, cols: usize) -> NdeResult<State> {
    if out.len() != rows * cols {
        return Err(NdeError::ShapeMismatch {
            what: "diffusion output (noise-rate prototype)",
            expected: rows * cols,
            found: out.len(),
        });
    }
    let flat: Vec<f64> = out.iter().copied().collect();
    Ok(Array2::from_shape_vec((rows, cols), flat)?.into_dyn())
}

/// `f(u, h, p, t) = model([u; h(p, t - τ₁); …]; p)`.
pub fn delay_dynamics<'a>(call: ModelCall<'a>, lags: &'a [f64]) -> DdeFn<'a> {
    Box::new(move |u, h: &History<'_>, p, t| {
        let mut parts: Vec<State> = Vec::with_capacity(lags.len() + 1);
        parts.push(u.to_owned());
        for &lag in lags {
            let past = h(p, t - lag)?;
            if past.shape() != u.shape() {
                return Err(NdeError::ShapeMismatch {
                    what: "delayed history state",
                    expected: u.len(),
                    found: past.len(),
                });
            }
            parts.push(past);
        }
        let views: Vec<StateView<'_>> = parts.iter().map(|a| a.view()).collect();
        let input = concatenate(Axis(0), &views)?;
        call.eval(input.view(), p)
    })
}

/// Residual `F(du, u, p, t)` of a masked DAE.
///
/// The model sees `[u; du]`; its outputs fill the `true` slots of `mask` and
/// the constraints' outputs fill the `false` slots, each in order.
pub fn masked_dae_residual<'a>(
    call: ModelCall<'a>, constraints: &'a ConstraintsFn, mask: &'a [bool],
) -> DaeFn<'a> {
    Box::new(move |du, u, p, t| {
        let input = concatenate(Axis(0), &[u.view(), du.view()])?;
        let nn_out = call.eval(input.view(), p)?;
        let alg_out = constraints(u, p, t)?;
        assemble_masked(mask, nn_out.view(), alg_out.view())
    })
}

/// `f(u, p, t) = [model(u; p); g(u, p, t)]`, matching mass-matrix row order.
///
/// The combined output must have exactly `mass_rows` rows; anything else is
/// a [`NdeError::ShapeMismatch`] on each call.
pub fn mass_matrix_dynamics<'a>(
    call: ModelCall<'a>, constraints: &'a ConstraintsFn, mass_rows: usize,
) -> OdeFn<'a> {
    Box::new(move |u, p, t| {
        let nn_out = call.eval(u.view(), p)?;
        let alg_out = constraints(u, p, t)?;
        let rhs = concat_outputs(nn_out.view(), alg_out.view())?;
        let found = rhs.len_of(Axis(0));
        if found != mass_rows {
            return Err(NdeError::ShapeMismatch {
                what: "mass matrix vs combined output",
                expected: mass_rows,
                found,
            });
        }
        Ok(rhs)
    })
}

/// Time gradient of autonomous dynamics: zeros shaped like `u`.
pub fn basic_tgrad<'a>() -> OdeFn<'a> {
    Box::new(|u, _p, _t| Ok(State::zeros(u.raw_dim())))
}

/// Delay counterpart of [`basic_tgrad`].
pub fn basic_dde_tgrad<'a>() -> DdeFn<'a> {
    Box::new(|u, _h: &History<'_>, _p, _t| Ok(State::zeros(u.raw_dim())))
}
