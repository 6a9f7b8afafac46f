//! Residual assembly for the DAE and mass-matrix layers.
//!
//! - [`assemble_masked`]: interleave model and constraint outputs by a
//!   differential-variable mask.
//! - [`concat_outputs`]: stack model outputs then constraint outputs, the
//!   fixed row order mass matrices assume.
//!
//! Both act on axis 0 so batched `(n, batch)` outputs are handled row-wise.
use ndarray::{concatenate, stack, Axis};

use crate::{
    errors::{NdeError, NdeResult},
    types::{State, StateView},
};

/// Interleave `nn_out` and `alg_out` rows according to `mask`.
///
/// Row `i` of the result is the next unused `nn_out` row when `mask[i]` is
/// `true`, otherwise the next unused `alg_out` row. Each source row is used
/// exactly once and keeps its relative order.
///
/// # Errors
/// [`NdeError::ShapeMismatch`] when `nn_out` does not have one row per `true`
/// entry, `alg_out` one row per `false` entry, or the trailing axes differ.
pub fn assemble_masked(
    mask: &[bool], nn_out: StateView<'_>, alg_out: StateView<'_>,
) -> NdeResult<State> {
    let n_diff = mask.iter().filter(|&&m| m).count();
    let n_alg = mask.len() - n_diff;
    check_rows("model output rows (differential variables)", n_diff, &nn_out)?;
    check_rows("constraint output rows (algebraic variables)", n_alg, &alg_out)?;
    if nn_out.shape()[1..] != alg_out.shape()[1..] {
        return Err(NdeError::ShapeMismatch {
            what: "residual trailing axes",
            expected: nn_out.shape()[1..].iter().product(),
            found: alg_out.shape()[1..].iter().product(),
        });
    }

    let mut iter_nn = 0;
    let mut iter_alg = 0;
    let rows: Vec<StateView<'_>> = mask
        .iter()
        .map(|&is_diff| {
            if is_diff {
                iter_nn += 1;
                nn_out.index_axis(Axis(0), iter_nn - 1)
            } else {
                iter_alg += 1;
                alg_out.index_axis(Axis(0), iter_alg - 1)
            }
        })
        .collect();
    if rows.is_empty() {
        return Ok(State::zeros(nn_out.raw_dim()));
    }
    Ok(stack(Axis(0), &rows)?)
}

/// `[nn_out; alg_out]` along axis 0.
pub fn concat_outputs(nn_out: StateView<'_>, alg_out: StateView<'_>) -> NdeResult<State> {
    concatenate(Axis(0), &[nn_out.view(), alg_out.view()]).map_err(|_| NdeError::ShapeMismatch {
        what: "constraint output trailing axes",
        expected: nn_out.shape()[1..].iter().product(),
        found: alg_out.shape()[1..].iter().product(),
    })
}

fn check_rows(what: &'static str, expected: usize, out: &StateView<'_>) -> NdeResult<()> {
    let found = if out.ndim() == 0 { 1 } else { out.len_of(Axis(0)) };
    if out.ndim() == 0 || found != expected {
        return Err(NdeError::ShapeMismatch { what, expected, found });
    }
    Ok(())
}
